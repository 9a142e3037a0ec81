use anyhow::{Context, Result};
use serde_json::{json, Value};

/// A saved visualization definition. The parameter blob shape depends on the
/// visualization kind and is copied from working charts of the application.
#[derive(Debug, Clone)]
pub struct ChartDef {
    pub key: &'static str,
    pub name: &'static str,
    pub viz_type: &'static str,
    pub dataset_key: &'static str,
    /// Fixed UUID so re-runs register the same identity.
    pub uuid: &'static str,
    /// Serialized parameter blob, without the `datasource` field.
    pub params_json: &'static str,
}

impl ChartDef {
    /// Render the parameter blob for insertion, injecting the datasource
    /// reference the application's front end resolves (`"{id}__table"`).
    pub fn params_for(&self, dataset_id: i64) -> Result<String> {
        let mut params: Value = serde_json::from_str(self.params_json)
            .with_context(|| format!("chart '{}' has malformed params", self.key))?;
        params["datasource"] = json!(format!("{}__table", dataset_id));
        Ok(params.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_inject_datasource() {
        let chart = ChartDef {
            key: "ch_test",
            name: "Test",
            viz_type: "pie",
            dataset_key: "ds_cargo",
            uuid: "00000000-0000-0000-0000-000000000000",
            params_json: r#"{"viz_type": "pie", "row_limit": 100}"#,
        };
        let rendered = chart.params_for(42).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["datasource"], "42__table");
        assert_eq!(value["viz_type"], "pie");
        assert_eq!(value["row_limit"], 100);
    }

    #[test]
    fn malformed_params_error_names_chart() {
        let chart = ChartDef {
            key: "ch_broken",
            name: "Broken",
            viz_type: "table",
            dataset_key: "ds_stations",
            uuid: "00000000-0000-0000-0000-000000000000",
            params_json: "{not json",
        };
        let err = chart.params_for(1).unwrap_err();
        assert!(err.to_string().contains("ch_broken"));
    }
}
