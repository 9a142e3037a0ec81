use anyhow::Result;

use crate::model::{ChartDef, ColumnMeta, DashboardDef, DatasetDef};

/// Result of the cleanup pass over previously-seeded demo rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupStats {
    pub datasets_removed: usize,
    pub charts_removed: usize,
}

/// Outcome of a connection-URI repair.
#[derive(Debug, Clone, PartialEq)]
pub enum UriRepair {
    /// No connection row with that name; nothing to fix.
    NotRegistered,
    AlreadyCorrect,
    Updated { old: String },
}

/// Access to the application's metadata database. The schema is owned by the
/// application; this toolkit only registers and removes rows in it.
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    /// Verify the application has initialized its metadata schema.
    async fn ensure_schema_present(&self) -> Result<()>;

    /// Start a provisioning session; all registrar writes happen inside it
    /// and become visible only on `commit`.
    async fn begin(&self) -> Result<Box<dyn MetadataSession>>;

    /// Point an existing connection row at a new URI. Used after the
    /// portable release is extracted somewhere else.
    async fn repair_connection_uri(&self, name: &str, uri: &str) -> Result<UriRepair>;
}

/// One transactional provisioning run against the metadata database.
#[async_trait::async_trait]
pub trait MetadataSession: Send {
    /// Delete previously-seeded demo rows: datasets by table-name prefix,
    /// charts by dataset reference and by name pattern, the dashboard by
    /// slug, and any orphaned column rows.
    async fn cleanup_demo_rows(
        &mut self,
        table_prefix: &str,
        dashboard_slug: &str,
        chart_name_patterns: &[&str],
    ) -> Result<CleanupStats>;

    /// Update or insert the connection row describing the dataset store.
    /// Returns the connection row id.
    async fn upsert_connection(&mut self, name: &str, uri: &str, uuid: &str) -> Result<i64>;

    /// Register one dataset row plus one row per column. Returns the dataset
    /// row id.
    async fn insert_dataset(
        &mut self,
        def: &DatasetDef,
        db_id: i64,
        connection_name: &str,
        columns: &[ColumnMeta],
    ) -> Result<i64>;

    /// Register one chart row. Returns the chart row id.
    async fn insert_chart(
        &mut self,
        def: &ChartDef,
        dataset_id: i64,
        dataset_name: &str,
    ) -> Result<i64>;

    /// Register the dashboard row. Returns the dashboard row id.
    async fn insert_dashboard(
        &mut self,
        def: &DashboardDef,
        position_json: &str,
        metadata_json: &str,
    ) -> Result<i64>;

    /// Link a chart to the dashboard through the join table.
    async fn link_chart(&mut self, dashboard_id: i64, chart_id: i64) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
