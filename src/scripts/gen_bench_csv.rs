use anyhow::{Context, Result};
use railbi_portable::bench;
use std::path::PathBuf;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let rows = match args.next() {
        Some(arg) => arg.parse::<u64>().context("row count must be an integer")?,
        None => bench::DEFAULT_ROWS,
    };
    let path = PathBuf::from(args.next().unwrap_or_else(|| "bench_data.csv".to_string()));

    println!("Generating {} rows to {}...", rows, path.display());
    let stats = bench::generate_csv(&path, rows)?;
    println!("{}", stats.summary());

    Ok(())
}
