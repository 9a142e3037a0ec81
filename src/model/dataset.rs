/// A dataset the pipeline registers with the application: one backing table
/// in the dataset store plus one metadata row with its columns.
#[derive(Debug, Clone)]
pub struct DatasetDef {
    /// Stable key used to wire charts to datasets.
    pub key: &'static str,
    pub table_name: &'static str,
    pub description: &'static str,
    /// Source CSV filename inside the demo-data directory.
    pub csv: &'static str,
    /// Temporal column the application should default to, if any.
    pub main_dttm_col: Option<&'static str>,
    /// Fixed UUID so re-runs register the same identity.
    pub uuid: &'static str,
}

impl DatasetDef {
    /// Permission string format the application expects for a dataset row.
    pub fn perm(&self, connection_name: &str, db_id: i64) -> String {
        format!("[{}].[{}](id:{})", connection_name, self.table_name, db_id)
    }
}
