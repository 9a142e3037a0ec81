//! Deterministic demo data synthesis. One seeded RNG drives every generator
//! so a given seed always produces the same distribution archive.

pub mod cities;
pub mod routes;
pub mod series;
pub mod stations;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Seed used by the shipped distribution.
pub const DEFAULT_SEED: u64 = 42;

/// Filename of the GeoJSON network overlay served next to the CSVs.
pub const NETWORK_OVERLAY: &str = "rail_network.geojson";

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub stations: usize,
    pub routes: usize,
    pub monthly_stats: usize,
    pub cargo_types: usize,
    pub daily_operations: usize,
    pub incidents: usize,
    pub kpi_metrics: usize,
}

impl GenerateReport {
    pub fn summary(&self) -> String {
        format!(
            "generated {} stations, {} routes, {} monthly rows, {} cargo rows, \
             {} daily rows, {} incidents, {} KPI rows",
            self.stations,
            self.routes,
            self.monthly_stats,
            self.cargo_types,
            self.daily_operations,
            self.incidents,
            self.kpi_metrics,
        )
    }
}

/// Generate every demo CSV plus the GeoJSON overlay into `demo_dir`.
pub fn generate_all(demo_dir: &Path, seed: u64) -> Result<GenerateReport> {
    fs::create_dir_all(demo_dir)
        .with_context(|| format!("cannot create {}", demo_dir.display()))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let stations = stations::generate_stations(&mut rng);
    let rail_routes = routes::generate_routes(&stations, &mut rng);
    let monthly = series::generate_monthly_stats(&mut rng);
    let cargo = series::generate_cargo_types(&mut rng);
    let daily = series::generate_daily_operations(&mut rng);
    let incidents = series::generate_incidents(&mut rng);
    let kpis = series::generate_kpi_metrics(&mut rng);

    write_csv(demo_dir, "rail_stations.csv", &stations)?;
    write_csv(demo_dir, "rail_routes.csv", &rail_routes)?;
    write_csv(demo_dir, "rail_monthly_stats.csv", &monthly)?;
    write_csv(demo_dir, "rail_cargo_types.csv", &cargo)?;
    write_csv(demo_dir, "rail_daily_operations.csv", &daily)?;
    write_csv(demo_dir, "rail_incidents.csv", &incidents)?;
    write_csv(demo_dir, "rail_kpi_metrics.csv", &kpis)?;

    let overlay = routes::route_overlay(&rail_routes, &mut rng);
    let overlay_path = demo_dir.join(NETWORK_OVERLAY);
    fs::write(&overlay_path, serde_json::to_string_pretty(&overlay)?)
        .with_context(|| format!("cannot write {}", overlay_path.display()))?;
    info!("wrote {}", overlay_path.display());

    Ok(GenerateReport {
        stations: stations.len(),
        routes: rail_routes.len(),
        monthly_stats: monthly.len(),
        cargo_types: cargo.len(),
        daily_operations: daily.len(),
        incidents: incidents.len(),
        kpi_metrics: kpis.len(),
    })
}

fn write_csv<T: Serialize>(demo_dir: &Path, filename: &str, rows: &[T]) -> Result<()> {
    let path = demo_dir.join(filename);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("wrote {} ({} rows)", path.display(), rows.len());
    Ok(())
}
