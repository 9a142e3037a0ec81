//! The provisioning pipeline: materialize the dataset store, then register
//! connection, datasets, charts and the dashboard in the application's
//! metadata database, all in one transaction after an idempotent cleanup.

pub mod data;

use anyhow::{bail, Result};
use log::warn;
use sqlx::sqlite::SqlitePool;
use std::collections::HashMap;
use std::path::Path;

use crate::config::sqlite_uri;
use crate::ingest::{self, TableLoad};
use crate::model::{ChartSlot, DashboardDef, PlacedChart};
use crate::store::{CleanupStats, MetadataStore};

#[derive(Debug)]
pub struct ProvisionReport {
    pub cleanup: CleanupStats,
    pub tables: Vec<TableLoad>,
    pub charts_registered: usize,
    pub dashboard_id: i64,
    pub dashboard_slug: &'static str,
}

impl ProvisionReport {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "provisioned {} datasets ({} rows), {} charts, dashboard '{}' (id={}); \
             cleanup removed {} datasets / {} charts",
            self.tables.len(),
            self.total_rows(),
            self.charts_registered,
            self.dashboard_slug,
            self.dashboard_id,
            self.cleanup.datasets_removed,
            self.cleanup.charts_removed,
        )
    }
}

/// Run the full seeding procedure. `dataset_db_path` is where the application
/// will find the dataset store, so the connection URI is derived from it.
pub async fn provision<S>(
    store: &S,
    dataset_pool: &SqlitePool,
    demo_dir: &Path,
    dataset_db_path: &Path,
) -> Result<ProvisionReport>
where
    S: MetadataStore + ?Sized,
{
    let tables = ingest::materialize(dataset_pool, demo_dir, data::DATASETS).await?;
    if tables.is_empty() {
        bail!(
            "no demo CSVs found in {}; run gen-demo-data first",
            demo_dir.display()
        );
    }

    store.ensure_schema_present().await?;
    let dashboard = data::dashboard();
    let mut session = store.begin().await?;

    let cleanup = session
        .cleanup_demo_rows(data::TABLE_PREFIX, dashboard.slug, data::CHART_NAME_PATTERNS)
        .await?;

    let db_id = session
        .upsert_connection(
            data::CONNECTION_NAME,
            &sqlite_uri(dataset_db_path),
            data::CONNECTION_UUID,
        )
        .await?;

    // Datasets: only those whose CSV actually materialized.
    let mut dataset_ids: HashMap<&str, (i64, &'static str)> = HashMap::new();
    for load in &tables {
        let def = data::DATASETS
            .iter()
            .find(|d| d.key == load.dataset_key)
            .expect("materialized table comes from the catalog");
        let id = session
            .insert_dataset(def, db_id, data::CONNECTION_NAME, &load.columns)
            .await?;
        dataset_ids.insert(def.key, (id, def.table_name));
    }

    let mut placed_by_key: HashMap<&str, PlacedChart> = HashMap::new();
    for chart in data::CHARTS {
        let Some((dataset_id, table_name)) = dataset_ids.get(chart.dataset_key) else {
            warn!(
                "skipping chart '{}': dataset '{}' was not materialized",
                chart.key, chart.dataset_key
            );
            continue;
        };
        let id = session.insert_chart(chart, *dataset_id, table_name).await?;
        placed_by_key.insert(
            chart.key,
            PlacedChart {
                id,
                name: chart.name.to_string(),
                uuid: chart.uuid.to_string(),
            },
        );
    }

    let dashboard = restrict_to_available(dashboard, &placed_by_key);
    let placed: Vec<(ChartSlot, PlacedChart)> = dashboard
        .slots()
        .map(|slot| (slot.clone(), placed_by_key[slot.chart_key].clone()))
        .collect();
    let position_json = dashboard.position_tree(&placed).to_string();
    let metadata_json = dashboard.json_metadata().to_string();
    let dashboard_id = session
        .insert_dashboard(&dashboard, &position_json, &metadata_json)
        .await?;
    for (_, chart) in &placed {
        session.link_chart(dashboard_id, chart.id).await?;
    }

    session.commit().await?;

    Ok(ProvisionReport {
        cleanup,
        tables,
        charts_registered: placed_by_key.len(),
        dashboard_id,
        dashboard_slug: dashboard.slug,
    })
}

/// Drop layout slots whose chart was skipped, and rows that end up empty.
fn restrict_to_available(
    dashboard: DashboardDef,
    placed: &HashMap<&str, PlacedChart>,
) -> DashboardDef {
    let rows: Vec<Vec<ChartSlot>> = dashboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .filter(|slot| placed.contains_key(slot.chart_key))
                .cloned()
                .collect::<Vec<_>>()
        })
        .filter(|row: &Vec<ChartSlot>| !row.is_empty())
        .collect();
    DashboardDef { rows, ..dashboard }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: i64) -> PlacedChart {
        PlacedChart {
            id,
            name: "x".to_string(),
            uuid: "c2000001-0001-0001-0001-000000000001".to_string(),
        }
    }

    #[test]
    fn full_catalog_keeps_every_row() {
        let mut available = HashMap::new();
        for chart in data::CHARTS {
            available.insert(chart.key, placed(1));
        }
        let dashboard = restrict_to_available(data::dashboard(), &available);
        assert_eq!(dashboard.rows.len(), 3);
        assert_eq!(dashboard.slots().count(), data::CHARTS.len());
    }

    #[test]
    fn missing_charts_drop_their_slots_and_empty_rows() {
        let mut available = HashMap::new();
        available.insert("ch_total_passengers", placed(1));
        available.insert("ch_monthly_revenue", placed(2));
        let dashboard = restrict_to_available(data::dashboard(), &available);
        // Only the first row survives.
        assert_eq!(dashboard.rows.len(), 1);
        assert_eq!(dashboard.rows[0].len(), 2);
    }
}
