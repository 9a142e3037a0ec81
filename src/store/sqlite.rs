use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Sqlite, Transaction};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::model::{ChartDef, ColumnMeta, DashboardDef, DatasetDef};
use crate::store::traits::{CleanupStats, MetadataSession, MetadataStore, UriRepair};

/// Conditions the toolkit refuses to work around: the application owns its
/// metadata store and must have created it.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata database not found at {0}; launch the application once so it initializes its store")]
    DatabaseMissing(PathBuf),
    #[error("metadata schema is missing table '{0}'; launch the application once so it initializes its store")]
    SchemaMissing(&'static str),
}

/// Tables the registrars touch. All of them must exist before provisioning.
const REQUIRED_TABLES: &[&str] = &[
    "dbs",
    "tables",
    "table_columns",
    "slices",
    "dashboards",
    "dashboard_slices",
];

#[derive(Debug, Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    /// Open the application's metadata database. The file must already
    /// exist; this toolkit never creates it.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MetadataError::DatabaseMissing(path.to_path_buf()).into());
        }
        let options = SqliteConnectOptions::new().filename(path);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("failed to open metadata database")?;
        Ok(Self { pool })
    }

    /// Wrap an already-connected pool (tests provision fixture schemas this way).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Open (or create) the dataset store the demo tables are materialized into.
pub async fn open_dataset_pool(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("failed to open dataset database")
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// The application stores UUIDs as 16-byte blobs.
fn uuid_blob(value: &str) -> Result<Vec<u8>> {
    let uuid = Uuid::parse_str(value).with_context(|| format!("invalid UUID '{}'", value))?;
    Ok(uuid.as_bytes().to_vec())
}

fn new_uuid_blob() -> Vec<u8> {
    Uuid::new_v4().as_bytes().to_vec()
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[async_trait::async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn ensure_schema_present(&self) -> Result<()> {
        for table in REQUIRED_TABLES.iter().copied() {
            let found =
                sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                    .bind(table)
                    .fetch_optional(&self.pool)
                    .await?;
            if found.is_none() {
                return Err(MetadataError::SchemaMissing(table).into());
            }
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn MetadataSession>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteMetadataSession { tx }))
    }

    async fn repair_connection_uri(&self, name: &str, uri: &str) -> Result<UriRepair> {
        let row = sqlx::query("SELECT id, sqlalchemy_uri FROM dbs WHERE database_name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(UriRepair::NotRegistered);
        };

        let id: i64 = row.get("id");
        let current: String = row.get("sqlalchemy_uri");
        if current == uri {
            return Ok(UriRepair::AlreadyCorrect);
        }

        sqlx::query("UPDATE dbs SET sqlalchemy_uri = ?, changed_on = ? WHERE id = ?")
            .bind(uri)
            .bind(now_iso())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to update connection URI")?;

        Ok(UriRepair::Updated { old: current })
    }
}

pub struct SqliteMetadataSession {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteMetadataSession {
    async fn demo_dataset_ids(&mut self, table_prefix: &str) -> Result<Vec<i64>> {
        let like = format!("{}%", table_prefix);
        let rows = sqlx::query("SELECT id FROM tables WHERE table_name LIKE ?")
            .bind(&like)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    /// Charts belonging to the demo: referenced by a demo dataset id, named
    /// after one of the demo charts, or pointing at a demo table by name.
    async fn demo_chart_ids(
        &mut self,
        dataset_ids: &[i64],
        table_prefix: &str,
        name_patterns: &[&str],
    ) -> Result<Vec<i64>> {
        let mut ids: HashSet<i64> = HashSet::new();

        if !dataset_ids.is_empty() {
            let sql = format!(
                "SELECT id FROM slices WHERE datasource_id IN ({})",
                placeholders(dataset_ids.len())
            );
            let mut query = sqlx::query(&sql);
            for id in dataset_ids {
                query = query.bind(id);
            }
            for row in query.fetch_all(&mut *self.tx).await? {
                ids.insert(row.get("id"));
            }
        }

        let mut clauses = vec!["datasource_name LIKE ?".to_string()];
        clauses.extend(name_patterns.iter().map(|_| "slice_name LIKE ?".to_string()));
        let sql = format!("SELECT id FROM slices WHERE {}", clauses.join(" OR "));
        let mut query = sqlx::query(&sql).bind(format!("{}%", table_prefix));
        for pattern in name_patterns {
            query = query.bind(*pattern);
        }
        for row in query.fetch_all(&mut *self.tx).await? {
            ids.insert(row.get("id"));
        }

        Ok(ids.into_iter().collect())
    }

    async fn delete_by_ids(&mut self, table: &str, column: &str, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "DELETE FROM {} WHERE {} IN ({})",
            table,
            column,
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        query.execute(&mut *self.tx).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MetadataSession for SqliteMetadataSession {
    async fn cleanup_demo_rows(
        &mut self,
        table_prefix: &str,
        dashboard_slug: &str,
        chart_name_patterns: &[&str],
    ) -> Result<CleanupStats> {
        let dataset_ids = self.demo_dataset_ids(table_prefix).await?;
        let chart_ids = self
            .demo_chart_ids(&dataset_ids, table_prefix, chart_name_patterns)
            .await?;

        // Join rows first, from both directions.
        sqlx::query(
            "DELETE FROM dashboard_slices WHERE dashboard_id IN \
             (SELECT id FROM dashboards WHERE slug = ?)",
        )
        .bind(dashboard_slug)
        .execute(&mut *self.tx)
        .await?;
        self.delete_by_ids("dashboard_slices", "slice_id", &chart_ids)
            .await?;

        self.delete_by_ids("slices", "id", &chart_ids).await?;

        self.delete_by_ids("table_columns", "table_id", &dataset_ids)
            .await?;
        sqlx::query("DELETE FROM tables WHERE table_name LIKE ?")
            .bind(format!("{}%", table_prefix))
            .execute(&mut *self.tx)
            .await?;

        sqlx::query("DELETE FROM dashboards WHERE slug = ?")
            .bind(dashboard_slug)
            .execute(&mut *self.tx)
            .await?;

        // Column rows whose dataset disappeared in some earlier run.
        sqlx::query("DELETE FROM table_columns WHERE table_id NOT IN (SELECT id FROM tables)")
            .execute(&mut *self.tx)
            .await?;

        Ok(CleanupStats {
            datasets_removed: dataset_ids.len(),
            charts_removed: chart_ids.len(),
        })
    }

    async fn upsert_connection(&mut self, name: &str, uri: &str, uuid: &str) -> Result<i64> {
        let now = now_iso();
        let uuid = uuid_blob(uuid)?;

        let existing = sqlx::query("SELECT id FROM dbs WHERE database_name = ?")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;

        if let Some(row) = existing {
            let id: i64 = row.get("id");
            sqlx::query(
                "UPDATE dbs SET sqlalchemy_uri = ?, uuid = ?, \
                 allow_file_upload = 1, expose_in_sqllab = 1, allow_dml = 1, \
                 changed_on = ? WHERE id = ?",
            )
            .bind(uri)
            .bind(&uuid)
            .bind(&now)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .context("failed to update connection row")?;
            return Ok(id);
        }

        let extra = serde_json::json!({
            "metadata_params": {},
            "engine_params": {},
            "metadata_cache_timeout": {},
            "schemas_allowed_for_file_upload": [],
        })
        .to_string();

        let result = sqlx::query(
            "INSERT INTO dbs (\
                 database_name, sqlalchemy_uri, uuid, extra, \
                 expose_in_sqllab, allow_dml, allow_file_upload, \
                 allow_ctas, allow_cvas, allow_run_async, \
                 select_as_create_table_as, impersonate_user, \
                 created_on, changed_on, created_by_fk, changed_by_fk\
             ) VALUES (?, ?, ?, ?, 1, 1, 1, 0, 0, 0, 0, 0, ?, ?, 1, 1)",
        )
        .bind(name)
        .bind(uri)
        .bind(&uuid)
        .bind(&extra)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await
        .context("failed to insert connection row")?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_dataset(
        &mut self,
        def: &DatasetDef,
        db_id: i64,
        connection_name: &str,
        columns: &[ColumnMeta],
    ) -> Result<i64> {
        let now = now_iso();
        let result = sqlx::query(
            "INSERT INTO tables (\
                 table_name, database_id, schema, description, \
                 is_sqllab_view, filter_select_enabled, is_featured, \
                 uuid, perm, main_dttm_col, \
                 created_on, changed_on, created_by_fk, changed_by_fk, \
                 is_managed_externally, normalize_columns, always_filter_main_dttm\
             ) VALUES (?, ?, '', ?, 0, 1, 0, ?, ?, ?, ?, ?, 1, 1, 0, 0, 0)",
        )
        .bind(def.table_name)
        .bind(db_id)
        .bind(def.description)
        .bind(uuid_blob(def.uuid)?)
        .bind(def.perm(connection_name, db_id))
        .bind(def.main_dttm_col)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await
        .with_context(|| format!("failed to register dataset '{}'", def.table_name))?;
        let table_id = result.last_insert_rowid();

        // Drop column rows left over from a reused row id.
        sqlx::query("DELETE FROM table_columns WHERE table_id = ?")
            .bind(table_id)
            .execute(&mut *self.tx)
            .await?;

        for column in columns {
            sqlx::query(
                "INSERT INTO table_columns (\
                     table_id, column_name, type, \
                     is_dttm, is_active, groupby, filterable, \
                     uuid, created_on, changed_on, created_by_fk, changed_by_fk\
                 ) VALUES (?, ?, ?, ?, 1, ?, ?, ?, ?, ?, 1, 1)",
            )
            .bind(table_id)
            .bind(&column.name)
            .bind(column.app_type())
            .bind(column.is_dttm as i64)
            .bind(column.groupby as i64)
            .bind(column.filterable as i64)
            .bind(new_uuid_blob())
            .bind(&now)
            .bind(&now)
            .execute(&mut *self.tx)
            .await
            .with_context(|| {
                format!(
                    "failed to register column '{}' of '{}'",
                    column.name, def.table_name
                )
            })?;
        }

        Ok(table_id)
    }

    async fn insert_chart(
        &mut self,
        def: &ChartDef,
        dataset_id: i64,
        dataset_name: &str,
    ) -> Result<i64> {
        let now = now_iso();
        let params = def.params_for(dataset_id)?;
        let result = sqlx::query(
            "INSERT INTO slices (\
                 slice_name, viz_type, datasource_type, \
                 datasource_id, datasource_name, params, uuid, \
                 created_on, changed_on, created_by_fk, changed_by_fk, \
                 is_managed_externally\
             ) VALUES (?, ?, 'table', ?, ?, ?, ?, ?, ?, 1, 1, 0)",
        )
        .bind(def.name)
        .bind(def.viz_type)
        .bind(dataset_id)
        .bind(dataset_name)
        .bind(params)
        .bind(uuid_blob(def.uuid)?)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await
        .with_context(|| format!("failed to register chart '{}'", def.name))?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_dashboard(
        &mut self,
        def: &DashboardDef,
        position_json: &str,
        metadata_json: &str,
    ) -> Result<i64> {
        let now = now_iso();
        let result = sqlx::query(
            "INSERT INTO dashboards (\
                 dashboard_title, slug, position_json, json_metadata, \
                 css, description, published, uuid, \
                 created_on, changed_on, created_by_fk, changed_by_fk, \
                 is_managed_externally\
             ) VALUES (?, ?, ?, ?, '', ?, 1, ?, ?, ?, 1, 1, 0)",
        )
        .bind(def.title)
        .bind(def.slug)
        .bind(position_json)
        .bind(metadata_json)
        .bind(def.description)
        .bind(uuid_blob(def.uuid)?)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.tx)
        .await
        .with_context(|| format!("failed to register dashboard '{}'", def.slug))?;

        Ok(result.last_insert_rowid())
    }

    async fn link_chart(&mut self, dashboard_id: i64, chart_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO dashboard_slices (dashboard_id, slice_id) VALUES (?, ?)")
            .bind(dashboard_id)
            .bind(chart_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.context("provisioning commit failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SqlType;

    /// Minimal copy of the application's schema, as its migrations create it.
    pub async fn fixture_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        for ddl in [
            "CREATE TABLE dbs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                database_name TEXT UNIQUE, sqlalchemy_uri TEXT, uuid BLOB, extra TEXT,
                expose_in_sqllab INTEGER, allow_dml INTEGER, allow_file_upload INTEGER,
                allow_ctas INTEGER, allow_cvas INTEGER, allow_run_async INTEGER,
                select_as_create_table_as INTEGER, impersonate_user INTEGER,
                created_on TEXT, changed_on TEXT, created_by_fk INTEGER, changed_by_fk INTEGER)",
            "CREATE TABLE tables (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                table_name TEXT, database_id INTEGER, schema TEXT, description TEXT,
                is_sqllab_view INTEGER, filter_select_enabled INTEGER, is_featured INTEGER,
                uuid BLOB, perm TEXT, main_dttm_col TEXT,
                created_on TEXT, changed_on TEXT, created_by_fk INTEGER, changed_by_fk INTEGER,
                is_managed_externally INTEGER, normalize_columns INTEGER,
                always_filter_main_dttm INTEGER)",
            "CREATE TABLE table_columns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                table_id INTEGER, column_name TEXT, type TEXT,
                is_dttm INTEGER, is_active INTEGER, groupby INTEGER, filterable INTEGER,
                uuid BLOB, created_on TEXT, changed_on TEXT,
                created_by_fk INTEGER, changed_by_fk INTEGER)",
            "CREATE TABLE slices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slice_name TEXT, viz_type TEXT, datasource_type TEXT,
                datasource_id INTEGER, datasource_name TEXT, params TEXT, uuid BLOB,
                created_on TEXT, changed_on TEXT, created_by_fk INTEGER, changed_by_fk INTEGER,
                is_managed_externally INTEGER)",
            "CREATE TABLE dashboards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dashboard_title TEXT, slug TEXT, position_json TEXT, json_metadata TEXT,
                css TEXT, description TEXT, published INTEGER, uuid BLOB,
                created_on TEXT, changed_on TEXT, created_by_fk INTEGER, changed_by_fk INTEGER,
                is_managed_externally INTEGER)",
            "CREATE TABLE dashboard_slices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dashboard_id INTEGER, slice_id INTEGER)",
        ] {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }
        pool
    }

    fn station_dataset() -> DatasetDef {
        DatasetDef {
            key: "ds_stations",
            table_name: "rail_stations",
            description: "Stations",
            csv: "rail_stations.csv",
            main_dttm_col: None,
            uuid: "d1000001-0001-0001-0001-000000000001",
        }
    }

    #[tokio::test]
    async fn schema_check_reports_missing_table() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteMetadataStore::from_pool(pool);
        let err = store.ensure_schema_present().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MetadataError>(),
            Some(MetadataError::SchemaMissing("dbs"))
        ));
    }

    #[tokio::test]
    async fn connection_upsert_inserts_then_updates() {
        let store = SqliteMetadataStore::from_pool(fixture_pool().await);
        let uuid = "a2dc77af-e654-49bb-b321-40f6b559a1ee";

        let mut session = store.begin().await.unwrap();
        let id = session
            .upsert_connection("examples", "sqlite:///a/examples.db", uuid)
            .await
            .unwrap();
        session.commit().await.unwrap();

        let mut session = store.begin().await.unwrap();
        let id_again = session
            .upsert_connection("examples", "sqlite:///b/examples.db", uuid)
            .await
            .unwrap();
        session.commit().await.unwrap();
        assert_eq!(id, id_again);

        let row = sqlx::query("SELECT sqlalchemy_uri, uuid FROM dbs WHERE id = ?")
            .bind(id)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("sqlalchemy_uri"), "sqlite:///b/examples.db");
        assert_eq!(
            row.get::<Vec<u8>, _>("uuid"),
            Uuid::parse_str(uuid).unwrap().as_bytes().to_vec()
        );
    }

    #[tokio::test]
    async fn repair_uri_only_touches_stale_rows() {
        let store = SqliteMetadataStore::from_pool(fixture_pool().await);
        assert_eq!(
            store
                .repair_connection_uri("examples", "sqlite:///x.db")
                .await
                .unwrap(),
            UriRepair::NotRegistered
        );

        let mut session = store.begin().await.unwrap();
        session
            .upsert_connection(
                "examples",
                "sqlite:///old.db",
                "a2dc77af-e654-49bb-b321-40f6b559a1ee",
            )
            .await
            .unwrap();
        session.commit().await.unwrap();

        assert_eq!(
            store
                .repair_connection_uri("examples", "sqlite:///new.db")
                .await
                .unwrap(),
            UriRepair::Updated { old: "sqlite:///old.db".to_string() }
        );
        assert_eq!(
            store
                .repair_connection_uri("examples", "sqlite:///new.db")
                .await
                .unwrap(),
            UriRepair::AlreadyCorrect
        );
    }

    #[tokio::test]
    async fn cleanup_removes_datasets_charts_and_orphans() {
        let store = SqliteMetadataStore::from_pool(fixture_pool().await);

        let mut session = store.begin().await.unwrap();
        let db_id = session
            .upsert_connection(
                "examples",
                "sqlite:///examples.db",
                "a2dc77af-e654-49bb-b321-40f6b559a1ee",
            )
            .await
            .unwrap();
        let columns = vec![ColumnMeta::from_inferred("name", SqlType::Text)];
        let ds_id = session
            .insert_dataset(&station_dataset(), db_id, "examples", &columns)
            .await
            .unwrap();
        let chart = ChartDef {
            key: "ch_tbl",
            name: "Busiest stations",
            viz_type: "table",
            dataset_key: "ds_stations",
            uuid: "c2000001-0001-0001-0001-000000000001",
            params_json: r#"{"viz_type": "table"}"#,
        };
        let chart_id = session
            .insert_chart(&chart, ds_id, "rail_stations")
            .await
            .unwrap();
        let dashboard = DashboardDef {
            title: "Railway Operations",
            slug: "rail_operations",
            description: "",
            uuid: "d3000001-0001-0001-0001-000000000001",
            rows: vec![],
        };
        let dash_id = session
            .insert_dashboard(&dashboard, "{}", "{}")
            .await
            .unwrap();
        session.link_chart(dash_id, chart_id).await.unwrap();
        session.commit().await.unwrap();

        // An orphaned column row from a hypothetical earlier run.
        sqlx::query(
            "INSERT INTO table_columns (table_id, column_name, type, is_dttm, is_active, \
             groupby, filterable, uuid, created_on, changed_on, created_by_fk, changed_by_fk) \
             VALUES (9999, 'ghost', 'STRING', 0, 1, 1, 1, x'00', '', '', 1, 1)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let mut session = store.begin().await.unwrap();
        let stats = session
            .cleanup_demo_rows("rail_", "rail_operations", &["%stations%"])
            .await
            .unwrap();
        session.commit().await.unwrap();

        assert_eq!(stats.datasets_removed, 1);
        assert_eq!(stats.charts_removed, 1);
        for (table, expected) in [
            ("tables", 0i64),
            ("table_columns", 0),
            ("slices", 0),
            ("dashboards", 0),
            ("dashboard_slices", 0),
        ] {
            let count: i64 = sqlx::query(&format!("SELECT count(*) AS n FROM {}", table))
                .fetch_one(store.pool())
                .await
                .unwrap()
                .get("n");
            assert_eq!(count, expected, "{} not cleaned", table);
        }
    }
}
