use serde_json::{json, Map, Value};

/// A chart placeholder inside a dashboard row. Width is in grid columns out
/// of twelve; height is in the application's layout units.
#[derive(Debug, Clone)]
pub struct ChartSlot {
    pub chart_key: &'static str,
    pub width: u32,
    pub height: u32,
}

/// A dashboard definition: rows of chart placeholders rendered into the
/// application's nested position tree at provisioning time.
#[derive(Debug, Clone)]
pub struct DashboardDef {
    pub title: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
    pub uuid: &'static str,
    pub rows: Vec<Vec<ChartSlot>>,
}

/// Identity of a chart row inserted during the current run. `id` must be the
/// actual `slices.id`; the front end resolves placeholders through it.
#[derive(Debug, Clone)]
pub struct PlacedChart {
    pub id: i64,
    pub name: String,
    pub uuid: String,
}

impl DashboardDef {
    /// Serialize the layout tree the application's front end consumes:
    /// ROOT -> GRID -> ROW* -> CHART*, plus a HEADER node. ROW children get
    /// no `parents` arrays; the application fills those in on first save.
    pub fn position_tree(&self, placed: &[(ChartSlot, PlacedChart)]) -> Value {
        let mut nodes = Map::new();
        let mut placed_iter = placed.iter();
        let mut row_ids = Vec::new();

        for (row_index, row) in self.rows.iter().enumerate() {
            let row_id = format!("ROW-{}", row_index + 1);
            let mut chart_ids = Vec::new();

            for _ in row {
                let (slot, chart) = placed_iter
                    .next()
                    .expect("placed charts must cover every slot");
                let node_id = format!("CHART-{}", slot.chart_key);
                nodes.insert(
                    node_id.clone(),
                    json!({
                        "id": node_id,
                        "type": "CHART",
                        "children": [],
                        "meta": {
                            "chartId": chart.id,
                            "width": slot.width,
                            "height": slot.height,
                            "sliceName": chart.name,
                            "uuid": chart.uuid,
                        },
                    }),
                );
                chart_ids.push(node_id);
            }

            nodes.insert(
                row_id.clone(),
                json!({
                    "id": row_id,
                    "type": "ROW",
                    "children": chart_ids,
                    "meta": { "background": "BACKGROUND_TRANSPARENT" },
                }),
            );
            row_ids.push(row_id);
        }

        nodes.insert(
            "DASHBOARD_VERSION_KEY".to_string(),
            Value::String("v2".to_string()),
        );
        nodes.insert(
            "ROOT_ID".to_string(),
            json!({ "id": "ROOT_ID", "type": "ROOT", "children": ["GRID_ID"] }),
        );
        nodes.insert(
            "GRID_ID".to_string(),
            json!({
                "id": "GRID_ID",
                "type": "GRID",
                "children": row_ids,
                "parents": ["ROOT_ID"],
            }),
        );
        nodes.insert(
            "HEADER_ID".to_string(),
            json!({ "id": "HEADER_ID", "type": "HEADER", "meta": { "text": self.title } }),
        );

        Value::Object(nodes)
    }

    /// Dashboard-level JSON metadata blob (color scheme and refresh knobs).
    pub fn json_metadata(&self) -> Value {
        json!({
            "color_scheme": "supersetColors",
            "refresh_frequency": 0,
            "expanded_slices": {},
            "timed_refresh_immune_slices": [],
            "label_colors": {},
            "shared_label_colors": {},
            "color_scheme_domain": [],
            "map_label_colors": {},
        })
    }

    /// Flatten the row grid into slot order, the order charts are placed in.
    pub fn slots(&self) -> impl Iterator<Item = &ChartSlot> {
        self.rows.iter().flatten()
    }
}
