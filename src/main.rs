use railbi_portable::config::AppConfig;
use railbi_portable::store::{open_dataset_pool, SqliteMetadataStore};
use railbi_portable::{demo, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("RailBI Portable: dashboard provisioning");

    let config = AppConfig::load()?;
    let demo_dir = config.demo_data_dir();

    // Regenerate demo data when asked to, or when it has never been built.
    if std::env::var("REGEN_DEMO_DATA").unwrap_or_default() == "true" || !demo_dir.exists() {
        println!("Generating demo data in {}...", demo_dir.display());
        let report = demo::generate_all(&demo_dir, demo::DEFAULT_SEED)?;
        println!("{}", report.summary());
    }

    // The dataset store is rebuilt from scratch on every run.
    let dataset_db = config.dataset_db_path();
    if dataset_db.exists() {
        std::fs::remove_file(&dataset_db)?;
        println!("Removed stale dataset store");
    }

    println!("Materializing dataset store at {}...", dataset_db.display());
    let dataset_pool = open_dataset_pool(&dataset_db).await?;

    println!(
        "Provisioning metadata at {}...",
        config.metadata_db_path().display()
    );
    let metadata = SqliteMetadataStore::open(&config.metadata_db_path()).await?;

    let report = seed::provision(&metadata, &dataset_pool, &demo_dir, &dataset_db).await?;
    println!("{}", report.summary());
    println!(
        "Start the application and open /dashboard/{}/ to see the demo.",
        report.dashboard_slug
    );

    Ok(())
}
