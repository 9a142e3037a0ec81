//! The static demo catalog: which tables, charts and dashboard the pipeline
//! provisions. Parameter blobs are copied from working charts of the
//! application; every key they carry is one its front end requires.

use crate::model::{ChartDef, ChartSlot, DashboardDef, DatasetDef};

/// Name of the connection row describing the dataset store.
pub const CONNECTION_NAME: &str = "examples";

/// Fixed UUID of the connection row, stable across re-runs.
pub const CONNECTION_UUID: &str = "a2dc77af-e654-49bb-b321-40f6b559a1ee";

/// Every demo table carries this prefix; cleanup keys off it.
pub const TABLE_PREFIX: &str = "rail_";

/// Name patterns the cleanup pass uses to catch demo charts that lost their
/// dataset reference in an earlier, partially-failed run.
pub const CHART_NAME_PATTERNS: &[&str] = &[
    "%Passenger%",
    "%Revenue%",
    "%Freight%",
    "%Station%",
    "%Incident%",
    "%KPI%",
];

pub const DATASETS: &[DatasetDef] = &[
    DatasetDef {
        key: "ds_stations",
        table_name: "rail_stations",
        description: "Principal stations of the demo network",
        csv: "rail_stations.csv",
        main_dttm_col: None,
        uuid: "d1000001-0001-0001-0001-000000000001",
    },
    DatasetDef {
        key: "ds_routes",
        table_name: "rail_routes",
        description: "Intercity corridors with daily service counts",
        csv: "rail_routes.csv",
        main_dttm_col: None,
        uuid: "d1000002-0002-0002-0002-000000000002",
    },
    DatasetDef {
        key: "ds_monthly",
        table_name: "rail_monthly_stats",
        description: "Monthly traffic and revenue, trailing 24 months",
        csv: "rail_monthly_stats.csv",
        main_dttm_col: None,
        uuid: "d1000003-0003-0003-0003-000000000003",
    },
    DatasetDef {
        key: "ds_cargo",
        table_name: "rail_cargo_types",
        description: "Freight mix by commodity group",
        csv: "rail_cargo_types.csv",
        main_dttm_col: None,
        uuid: "d1000004-0004-0004-0004-000000000004",
    },
    DatasetDef {
        key: "ds_daily",
        table_name: "rail_daily_operations",
        description: "Daily operations by region and service kind",
        csv: "rail_daily_operations.csv",
        main_dttm_col: Some("date"),
        uuid: "d1000005-0005-0005-0005-000000000005",
    },
    DatasetDef {
        key: "ds_incidents",
        table_name: "rail_incidents",
        description: "Operational incident log",
        csv: "rail_incidents.csv",
        main_dttm_col: Some("date"),
        uuid: "d1000006-0006-0006-0006-000000000006",
    },
    DatasetDef {
        key: "ds_kpi",
        table_name: "rail_kpi_metrics",
        description: "Quarterly performance indicators against targets",
        csv: "rail_kpi_metrics.csv",
        main_dttm_col: None,
        uuid: "d1000007-0007-0007-0007-000000000007",
    },
];

pub const DASHBOARD_UUID: &str = "d3000001-0001-0001-0001-000000000001";

pub const CHARTS: &[ChartDef] = &[
    ChartDef {
        key: "ch_total_passengers",
        name: "Passengers carried (mln)",
        viz_type: "big_number_total",
        dataset_key: "ds_monthly",
        uuid: "c2000001-0001-0001-0001-000000000001",
        params_json: r#"{
            "viz_type": "big_number_total",
            "granularity_sqla": null,
            "time_range": "No filter",
            "metric": {
                "aggregate": "SUM",
                "column": {"column_name": "passengers_mln", "type": "FLOAT"},
                "expressionType": "SIMPLE",
                "label": "SUM(passengers_mln)",
                "optionName": "metric_rail_1"
            },
            "subheader": "million passengers, trailing 24 months",
            "y_axis_format": ",.1f",
            "row_limit": 10000
        }"#,
    },
    ChartDef {
        key: "ch_monthly_revenue",
        name: "Revenue by month (mln EUR)",
        viz_type: "echarts_timeseries_bar",
        dataset_key: "ds_monthly",
        uuid: "c2000002-0002-0002-0002-000000000002",
        params_json: r#"{
            "viz_type": "echarts_timeseries_bar",
            "granularity_sqla": null,
            "time_range": "No filter",
            "x_axis": "month",
            "x_axis_sort_asc": true,
            "metrics": [{
                "aggregate": "SUM",
                "column": {"column_name": "revenue_mln_eur", "type": "FLOAT"},
                "expressionType": "SIMPLE",
                "label": "Revenue (mln EUR)",
                "optionName": "metric_rail_2"
            }],
            "groupby": [],
            "row_limit": 10000,
            "order_desc": true,
            "show_legend": true,
            "rich_tooltip": true,
            "y_axis_format": ",.1f",
            "truncate_metric": true
        }"#,
    },
    ChartDef {
        key: "ch_cargo_mix",
        name: "Freight mix by commodity",
        viz_type: "pie",
        dataset_key: "ds_cargo",
        uuid: "c2000003-0003-0003-0003-000000000003",
        params_json: r#"{
            "viz_type": "pie",
            "granularity_sqla": null,
            "time_range": "No filter",
            "groupby": ["cargo_type"],
            "metric": {
                "aggregate": "SUM",
                "column": {"column_name": "volume_mln_tons", "type": "FLOAT"},
                "expressionType": "SIMPLE",
                "label": "Volume (mln tons)",
                "optionName": "metric_rail_3"
            },
            "row_limit": 100,
            "sort_by_metric": true,
            "color_scheme": "supersetColors",
            "show_labels": true,
            "show_legend": true,
            "label_type": "key_percent",
            "number_format": ",.1f"
        }"#,
    },
    ChartDef {
        key: "ch_station_table",
        name: "Busiest stations",
        viz_type: "table",
        dataset_key: "ds_stations",
        uuid: "c2000004-0004-0004-0004-000000000004",
        params_json: r#"{
            "viz_type": "table",
            "granularity_sqla": null,
            "time_range": "No filter",
            "query_mode": "raw",
            "all_columns": ["name", "city", "region", "division",
                            "passengers_day", "cargo_tons_year", "station_class"],
            "order_by_cols": ["[\"passengers_day\", false]"],
            "row_limit": 50,
            "include_search": true,
            "page_length": 15,
            "color_pn": true
        }"#,
    },
    ChartDef {
        key: "ch_daily_passengers",
        name: "Passengers by region (thousands)",
        viz_type: "echarts_timeseries_line",
        dataset_key: "ds_daily",
        uuid: "c2000005-0005-0005-0005-000000000005",
        params_json: r#"{
            "viz_type": "echarts_timeseries_line",
            "granularity_sqla": "date",
            "time_range": "No filter",
            "metrics": [{
                "aggregate": "SUM",
                "column": {"column_name": "passengers_thousands", "type": "FLOAT"},
                "expressionType": "SIMPLE",
                "label": "Passengers (thousands)",
                "optionName": "metric_rail_5"
            }],
            "groupby": ["region"],
            "row_limit": 10000,
            "order_desc": true,
            "show_legend": true,
            "rich_tooltip": true,
            "y_axis_format": ",.0f",
            "color_scheme": "supersetColors"
        }"#,
    },
    ChartDef {
        key: "ch_incident_breakdown",
        name: "Incidents by type and severity",
        viz_type: "echarts_timeseries_bar",
        dataset_key: "ds_incidents",
        uuid: "c2000006-0006-0006-0006-000000000006",
        params_json: r#"{
            "viz_type": "echarts_timeseries_bar",
            "granularity_sqla": null,
            "time_range": "No filter",
            "x_axis": "incident_type",
            "metrics": [{
                "aggregate": "COUNT",
                "column": {"column_name": "incident_id", "type": "STRING"},
                "expressionType": "SIMPLE",
                "label": "Incidents",
                "optionName": "metric_rail_6"
            }],
            "groupby": ["severity"],
            "row_limit": 10000,
            "order_desc": true,
            "color_scheme": "supersetColors",
            "show_legend": true,
            "stack": true,
            "y_axis_format": ",.0f"
        }"#,
    },
];

/// The dashboard grid: three rows, widths out of twelve columns.
pub fn dashboard() -> DashboardDef {
    DashboardDef {
        title: "Railway Operations Overview",
        slug: "rail_operations",
        description: "Demo dashboard: network traffic, freight mix and reliability",
        uuid: DASHBOARD_UUID,
        rows: vec![
            vec![
                ChartSlot { chart_key: "ch_total_passengers", width: 4, height: 50 },
                ChartSlot { chart_key: "ch_monthly_revenue", width: 8, height: 50 },
            ],
            vec![
                ChartSlot { chart_key: "ch_cargo_mix", width: 4, height: 50 },
                ChartSlot { chart_key: "ch_daily_passengers", width: 8, height: 50 },
            ],
            vec![
                ChartSlot { chart_key: "ch_station_table", width: 8, height: 50 },
                ChartSlot { chart_key: "ch_incident_breakdown", width: 4, height: 50 },
            ],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_chart_references_a_known_dataset() {
        let keys: HashSet<&str> = DATASETS.iter().map(|d| d.key).collect();
        for chart in CHARTS {
            assert!(
                keys.contains(chart.dataset_key),
                "chart '{}' references unknown dataset '{}'",
                chart.key,
                chart.dataset_key
            );
        }
    }

    #[test]
    fn every_dashboard_slot_references_a_known_chart() {
        let keys: HashSet<&str> = CHARTS.iter().map(|c| c.key).collect();
        for slot in dashboard().slots() {
            assert!(keys.contains(slot.chart_key), "unknown chart '{}'", slot.chart_key);
        }
    }

    #[test]
    fn dashboard_rows_fill_twelve_columns() {
        for row in &dashboard().rows {
            let total: u32 = row.iter().map(|s| s.width).sum();
            assert_eq!(total, 12);
        }
    }

    #[test]
    fn uuids_are_unique_and_parse() {
        let mut seen = HashSet::new();
        let all = DATASETS
            .iter()
            .map(|d| d.uuid)
            .chain(CHARTS.iter().map(|c| c.uuid))
            .chain([CONNECTION_UUID, DASHBOARD_UUID]);
        for uuid in all {
            assert!(uuid::Uuid::parse_str(uuid).is_ok(), "bad uuid {}", uuid);
            assert!(seen.insert(uuid), "duplicate uuid {}", uuid);
        }
    }

    #[test]
    fn params_blobs_are_valid_json_with_viz_type() {
        for chart in CHARTS {
            let value: serde_json::Value = serde_json::from_str(chart.params_json)
                .unwrap_or_else(|e| panic!("chart '{}': {}", chart.key, e));
            assert_eq!(value["viz_type"], chart.viz_type);
            assert!(value.get("time_range").is_some(), "chart '{}'", chart.key);
        }
    }

    #[test]
    fn all_demo_tables_share_the_cleanup_prefix() {
        for dataset in DATASETS {
            assert!(dataset.table_name.starts_with(TABLE_PREFIX));
        }
    }
}
