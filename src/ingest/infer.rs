use crate::model::SqlType;

/// Number of rows sampled per column when inferring a table schema.
const SAMPLE_ROWS: usize = 50;

/// Infer the storage type of one column from sampled values. Empty values
/// are ignored. A column is INTEGER when every sample parses as i64, REAL
/// when every sample is numeric but at least one is fractional, TEXT
/// otherwise. No non-empty samples at all infers INTEGER (the numeric check
/// is vacuously true), which SQLite affinity tolerates either way.
pub fn infer_sql_type<'a, I>(values: I) -> SqlType
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    for value in values.clone() {
        if value.is_empty() {
            continue;
        }
        if value.parse::<i64>().is_ok() {
            continue;
        }
        if value.parse::<f64>().is_err() {
            return SqlType::Text;
        }
    }

    // All numeric: decide int vs float.
    for value in values {
        if value.is_empty() {
            continue;
        }
        if value.parse::<i64>().is_err() {
            return SqlType::Real;
        }
    }
    SqlType::Integer
}

/// Infer column types for a whole table from its header and data rows,
/// sampling the first rows of each column. An empty table infers TEXT for
/// every column.
pub fn infer_schema(
    headers: &csv::StringRecord,
    rows: &[csv::StringRecord],
) -> Vec<(String, SqlType)> {
    if rows.is_empty() {
        return headers
            .iter()
            .map(|h| (h.to_string(), SqlType::Text))
            .collect();
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let samples: Vec<&str> = rows
                .iter()
                .take(SAMPLE_ROWS)
                .filter_map(|row| row.get(i))
                .collect();
            (header.to_string(), infer_sql_type(samples))
        })
        .collect()
}
