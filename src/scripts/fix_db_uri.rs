use anyhow::Result;
use railbi_portable::config::{sqlite_uri, AppConfig};
use railbi_portable::seed::data;
use railbi_portable::store::{MetadataStore, SqliteMetadataStore, UriRepair};

/// Repairs the dataset-store URI after the portable release is extracted at
/// a new location. Run this before starting the application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load()?;
    if !config.dataset_db_path().exists() {
        println!(
            "[WARN] dataset store not found at {}; the demo dashboard will have no data",
            config.dataset_db_path().display()
        );
    }

    let store = SqliteMetadataStore::open(&config.metadata_db_path()).await?;
    let uri = sqlite_uri(&config.dataset_db_path());

    match store.repair_connection_uri(data::CONNECTION_NAME, &uri).await? {
        UriRepair::NotRegistered => {
            println!("No '{}' connection registered; nothing to fix.", data::CONNECTION_NAME);
        }
        UriRepair::AlreadyCorrect => {
            println!("URI already correct: {}", uri);
        }
        UriRepair::Updated { old } => {
            println!("Updated dataset store URI");
            println!("  old: {}", old);
            println!("  new: {}", uri);
        }
    }

    Ok(())
}
