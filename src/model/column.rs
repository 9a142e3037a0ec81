use serde::{Deserialize, Serialize};

/// Storage type in the embeddable dataset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }

    /// The application's column-type vocabulary for this storage type.
    pub fn app_type(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "FLOAT",
            SqlType::Text => "STRING",
        }
    }
}

/// Per-column registration flags for the application's dataset metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub sql_type: SqlType,
    pub is_dttm: bool,
    pub groupby: bool,
    pub filterable: bool,
}

impl ColumnMeta {
    /// Registration flags follow the storage type: REAL measures are not
    /// groupable, and a column named `date` is the temporal column (kept as
    /// STRING because the store holds it as TEXT).
    pub fn from_inferred(name: &str, sql_type: SqlType) -> Self {
        Self {
            name: name.to_string(),
            sql_type,
            is_dttm: name == "date",
            groupby: sql_type != SqlType::Real,
            filterable: true,
        }
    }

    /// Type name as the application expects it in `table_columns.type`.
    pub fn app_type(&self) -> &'static str {
        if self.is_dttm {
            // Temporal columns are TEXT in the store regardless of inference.
            return "STRING";
        }
        self.sql_type.app_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_columns_are_not_groupable() {
        let col = ColumnMeta::from_inferred("revenue_mln_eur", SqlType::Real);
        assert!(!col.groupby);
        assert!(col.filterable);
        assert_eq!(col.app_type(), "FLOAT");
    }

    #[test]
    fn date_column_is_temporal_string() {
        let col = ColumnMeta::from_inferred("date", SqlType::Text);
        assert!(col.is_dttm);
        assert_eq!(col.app_type(), "STRING");
    }

    #[test]
    fn integer_columns_keep_integer_vocabulary() {
        let col = ColumnMeta::from_inferred("trains_count", SqlType::Integer);
        assert!(col.groupby);
        assert_eq!(col.app_type(), "INTEGER");
        assert_eq!(col.sql_type.as_sql(), "INTEGER");
    }
}
