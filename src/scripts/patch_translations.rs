use anyhow::{Context, Result};
use railbi_portable::translations;
use std::path::Path;

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let path = std::env::args()
        .nth(1)
        .context("usage: patch-translations <path/to/messages.po>")?;

    let filled =
        translations::patch_catalog(Path::new(&path), &translations::default_overrides())?;
    println!("Filled {} catalog entries", filled);

    Ok(())
}
