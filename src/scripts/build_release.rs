use anyhow::Result;
use railbi_portable::config::AppConfig;
use railbi_portable::packer::{ReleaseFormat, ReleasePacker};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load()?;
    let format = if std::env::args().any(|arg| arg == "--zstd") {
        ReleaseFormat::TarZstd
    } else {
        ReleaseFormat::Zip
    };

    println!("Building release '{}'", config.release.name);
    let stats = ReleasePacker::new(&config).pack(format)?;
    println!("{}", stats.summary());
    println!();
    println!("Transfer instructions:");
    println!("  1. Copy the archive from {}", config.release_output_dir().display());
    println!("  2. Extract it anywhere on the target machine");
    println!("  3. Run fix-db-uri once, then start.bat");

    Ok(())
}
