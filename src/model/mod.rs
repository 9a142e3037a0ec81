pub mod chart;
pub mod column;
pub mod dataset;
pub mod layout;
pub mod records;

pub use chart::ChartDef;
pub use column::{ColumnMeta, SqlType};
pub use dataset::DatasetDef;
pub use layout::{ChartSlot, DashboardDef, PlacedChart};
pub use records::{
    CargoType, DailyOperation, Incident, KpiMetric, MonthlyStat, RailRoute, Station,
};
