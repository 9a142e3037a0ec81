//! Load-test CSV generator for exercising the application's file-upload
//! path with something much bigger than the demo data.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::time::Instant;

pub const DEFAULT_ROWS: u64 = 1_000_000;

const CATEGORIES: &[&str] = &["A", "B", "C", "D"];

const FILLER: &str =
    "This is a long description text to fill up space and make the file larger.";

#[derive(Debug)]
pub struct BenchStats {
    pub rows: u64,
    pub size_bytes: u64,
    pub duration_secs: f64,
}

impl BenchStats {
    pub fn summary(&self) -> String {
        format!(
            "wrote {} rows ({:.2} MB) in {:.2}s",
            self.rows,
            self.size_bytes as f64 / 1_048_576.0,
            self.duration_secs
        )
    }
}

/// Write `rows` synthetic records. The csv writer buffers internally, so no
/// explicit batching is needed to keep this fast.
pub fn generate_csv(path: &Path, rows: u64) -> Result<BenchStats> {
    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(rows);

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    writer.write_record(["id", "name", "value", "category", "date", "description"])?;

    for i in 0..rows {
        let id = i.to_string();
        let name = format!("Item {}", i);
        let value = format!("{:.6}", rng.gen::<f64>() * 1000.0);
        writer.write_record([
            id.as_str(),
            name.as_str(),
            value.as_str(),
            CATEGORIES[rng.gen_range(0..CATEGORIES.len())],
            "2024-01-01",
            FILLER,
        ])?;
    }
    writer.flush()?;

    let size_bytes = std::fs::metadata(path)?.len();
    Ok(BenchStats {
        rows,
        size_bytes,
        duration_secs: start.elapsed().as_secs_f64(),
    })
}
