use anyhow::{Context, Result};
use railbi_portable::config::AppConfig;
use railbi_portable::demo;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load()?;
    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>().context("seed must be an integer")?,
        None => demo::DEFAULT_SEED,
    };

    let demo_dir = config.demo_data_dir();
    println!("Generating demo data in {} (seed {})", demo_dir.display(), seed);
    let report = demo::generate_all(&demo_dir, seed)?;
    println!("{}", report.summary());

    Ok(())
}
