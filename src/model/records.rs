use serde::{Deserialize, Serialize};

/// A railway station synthesized from the city gazetteer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub passengers_day: i64,
    pub cargo_tons_year: i64,
    pub division: String,
    pub station_class: i64,
}

/// A route between two central stations, with its GeoJSON geometry inline so
/// map visualizations can consume the column directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailRoute {
    pub id: i64,
    pub origin_id: i64,
    pub origin_name: String,
    pub dest_id: i64,
    pub dest_name: String,
    pub distance_km: f64,
    pub trains_per_day: i64,
    pub geometry: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub month: i64,
    pub year: i64,
    pub passengers_mln: f64,
    pub cargo_mln_tons: f64,
    pub revenue_mln_eur: f64,
    pub on_time_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CargoType {
    pub cargo_type: String,
    pub volume_mln_tons: f64,
    pub share_pct: f64,
    pub revenue_mln_eur: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyOperation {
    pub date: String,
    pub region: String,
    pub service: String,
    pub passengers_thousands: f64,
    pub cargo_tons_thousands: f64,
    pub revenue_thousands_eur: f64,
    pub avg_speed_kmh: f64,
    pub delay_minutes: i64,
    pub trains_count: i64,
    pub occupancy_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: String,
    pub date: String,
    pub time: String,
    pub region: String,
    pub division: String,
    pub incident_type: String,
    pub severity: String,
    pub duration_minutes: i64,
    pub affected_trains: i64,
    pub resolved: String,
    pub cause: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiMetric {
    pub year: i64,
    pub quarter: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub unit: String,
    pub yoy_change_pct: f64,
    pub target_value: f64,
    pub target_met: String,
}
