//! Dataset materializer: reads the demo CSV files, infers column types and
//! (re)creates the backing tables in the dataset store.

pub mod infer;

use anyhow::{Context, Result};
use log::{info, warn};
use sqlx::sqlite::SqlitePool;
use std::path::Path;

use crate::model::{ColumnMeta, DatasetDef, SqlType};

/// Outcome of materializing one dataset table.
#[derive(Debug, Clone)]
pub struct TableLoad {
    pub dataset_key: &'static str,
    pub table_name: &'static str,
    pub rows: u64,
    pub columns: Vec<ColumnMeta>,
}

/// Materialize every dataset whose CSV is present: drop and recreate the
/// backing table from the inferred schema, then batch-insert all rows in one
/// transaction. Missing CSVs are skipped with a warning; the caller decides
/// what that means for registration.
pub async fn materialize(
    pool: &SqlitePool,
    demo_dir: &Path,
    datasets: &[DatasetDef],
) -> Result<Vec<TableLoad>> {
    let mut loads = Vec::new();

    for dataset in datasets {
        let csv_path = demo_dir.join(dataset.csv);
        if !csv_path.exists() {
            warn!("demo CSV not found, skipping table: {}", csv_path.display());
            continue;
        }
        let load = materialize_table(pool, &csv_path, dataset)
            .await
            .with_context(|| format!("failed to materialize table '{}'", dataset.table_name))?;
        info!(
            "materialized {}: {} rows, {} columns",
            load.table_name,
            load.rows,
            load.columns.len()
        );
        loads.push(load);
    }

    Ok(loads)
}

async fn materialize_table(
    pool: &SqlitePool,
    csv_path: &Path,
    dataset: &DatasetDef,
) -> Result<TableLoad> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("cannot open CSV {}", csv_path.display()))?;
    let headers = reader.headers()?.clone();
    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .with_context(|| format!("malformed CSV {}", csv_path.display()))?;

    let schema = infer::infer_schema(&headers, &rows);
    let columns: Vec<ColumnMeta> = schema
        .iter()
        .map(|(name, sql_type)| ColumnMeta::from_inferred(name, *sql_type))
        .collect();

    let mut tx = pool.begin().await?;

    sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", dataset.table_name))
        .execute(&mut *tx)
        .await?;

    let column_defs: Vec<String> = schema
        .iter()
        .map(|(name, sql_type)| format!("\"{}\" {}", name, sql_type.as_sql()))
        .collect();
    sqlx::query(&format!(
        "CREATE TABLE \"{}\" ({})",
        dataset.table_name,
        column_defs.join(", ")
    ))
    .execute(&mut *tx)
    .await?;

    let placeholders: Vec<&str> = (0..headers.len()).map(|_| "?").collect();
    let insert_sql = format!(
        "INSERT INTO \"{}\" VALUES ({})",
        dataset.table_name,
        placeholders.join(", ")
    );

    let mut inserted = 0u64;
    for row in &rows {
        let mut query = sqlx::query(&insert_sql);
        for (i, (_, sql_type)) in schema.iter().enumerate() {
            query = bind_field(query, row.get(i), *sql_type);
        }
        query.execute(&mut *tx).await?;
        inserted += 1;
    }

    tx.commit().await?;

    Ok(TableLoad {
        dataset_key: dataset.key,
        table_name: dataset.table_name,
        rows: inserted,
        columns,
    })
}

type SqliteQuery<'q> =
    sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

/// Bind one CSV field under its inferred type. Empty or absent fields become
/// NULL; a numeric column with an unparseable value falls back to the raw
/// text (SQLite affinity keeps the column usable).
fn bind_field<'q>(
    query: SqliteQuery<'q>,
    field: Option<&str>,
    sql_type: SqlType,
) -> SqliteQuery<'q> {
    let value = match field {
        None | Some("") => return query.bind(Option::<String>::None),
        Some(v) => v,
    };
    match sql_type {
        SqlType::Integer => match value.parse::<i64>() {
            Ok(n) => query.bind(n),
            Err(_) => query.bind(value.to_string()),
        },
        SqlType::Real => match value.parse::<f64>() {
            Ok(f) => query.bind(f),
            Err(_) => query.bind(value.to_string()),
        },
        SqlType::Text => query.bind(value.to_string()),
    }
}
