//! Templated time-series generators for the non-spatial demo tables.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;

use crate::demo::stations::sample_volume;
use crate::model::{CargoType, DailyOperation, Incident, KpiMetric, MonthlyStat};

/// Operating regions the series are broken down by.
pub const REGIONS: &[&str] = &["North", "South", "East", "West", "Central"];

const SERVICES: &[&str] = &["High-speed", "Intercity", "Regional", "Freight"];

/// Months of monthly statistics (trailing two years).
const MONTHS: usize = 24;

/// Monthly traffic with a summer peak and mild noise.
pub fn generate_monthly_stats(rng: &mut StdRng) -> Vec<MonthlyStat> {
    let mut stats = Vec::with_capacity(MONTHS);
    for index in 0..MONTHS {
        let year = 2024 + (index / 12) as i64;
        let month = (index % 12) as i64 + 1;
        // Peak around July, trough in January.
        let seasonal = 1.0 + 0.18 * ((month as f64 - 4.0) / 12.0 * std::f64::consts::TAU).sin();
        let passengers_mln = sample_volume(rng, 95.0 * seasonal, 3.0);
        let cargo_mln_tons = sample_volume(rng, 101.0, 4.0);
        let revenue_mln_eur = passengers_mln * 9.5 + cargo_mln_tons * 11.0
            + sample_volume(rng, 120.0, 25.0);
        stats.push(MonthlyStat {
            month,
            year,
            passengers_mln: round1(passengers_mln),
            cargo_mln_tons: round1(cargo_mln_tons),
            revenue_mln_eur: round1(revenue_mln_eur),
            on_time_pct: round1(sample_volume(rng, 91.0, 1.5).clamp(80.0, 99.5)),
        });
    }
    stats
}

/// Commodity catalog with rough annual volumes (mln tons) and revenue rates.
const COMMODITIES: &[(&str, f64, f64)] = &[
    ("Coal", 310.0, 6.0),
    ("Ore & metals", 120.0, 9.5),
    ("Oil & fuels", 210.0, 8.0),
    ("Grain", 65.0, 7.0),
    ("Timber", 40.0, 5.5),
    ("Containers", 80.0, 14.0),
    ("Chemicals & fertilizers", 95.0, 10.5),
    ("Construction materials", 130.0, 4.5),
    ("Machinery", 28.0, 16.0),
    ("Other", 55.0, 6.5),
];

pub fn generate_cargo_types(rng: &mut StdRng) -> Vec<CargoType> {
    let volumes: Vec<f64> = COMMODITIES
        .iter()
        .map(|(_, base, _)| base * rng.gen_range(0.9..1.1))
        .collect();
    let total: f64 = volumes.iter().sum();

    COMMODITIES
        .iter()
        .zip(volumes)
        .map(|((name, _, rate), volume)| CargoType {
            cargo_type: name.to_string(),
            volume_mln_tons: round1(volume),
            share_pct: round1(volume / total * 100.0),
            revenue_mln_eur: round1(volume * rate),
        })
        .collect()
}

/// Days of daily-operations history.
const DAILY_DAYS: i64 = 120;

pub fn generate_daily_operations(rng: &mut StdRng) -> Vec<DailyOperation> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid start date");
    let mut operations = Vec::new();

    for day in 0..DAILY_DAYS {
        let date = (start + Duration::days(day)).format("%Y-%m-%d").to_string();
        for region in REGIONS {
            for service in SERVICES {
                let freight = *service == "Freight";
                let passengers = if freight {
                    0.0
                } else {
                    sample_volume(rng, 220.0, 45.0)
                };
                let cargo = if freight {
                    sample_volume(rng, 900.0, 150.0)
                } else {
                    sample_volume(rng, 15.0, 8.0)
                };
                operations.push(DailyOperation {
                    date: date.clone(),
                    region: region.to_string(),
                    service: service.to_string(),
                    passengers_thousands: round1(passengers),
                    cargo_tons_thousands: round1(cargo),
                    revenue_thousands_eur: round1(passengers * 11.0 + cargo * 4.2),
                    avg_speed_kmh: round1(match *service {
                        "High-speed" => sample_volume(rng, 215.0, 18.0),
                        "Intercity" => sample_volume(rng, 110.0, 10.0),
                        "Regional" => sample_volume(rng, 62.0, 7.0),
                        _ => sample_volume(rng, 48.0, 6.0),
                    }),
                    delay_minutes: rng.gen_range(0..25),
                    trains_count: rng.gen_range(40..320),
                    occupancy_pct: round1(sample_volume(rng, 68.0, 12.0).clamp(10.0, 100.0)),
                });
            }
        }
    }

    operations
}

const INCIDENT_TYPES: &[&str] = &[
    "Signal failure",
    "Track damage",
    "Rolling stock fault",
    "Weather disruption",
    "Power outage",
    "Line obstruction",
];

const INCIDENT_CAUSES: &[&str] = &[
    "Equipment wear",
    "Severe weather",
    "Human error",
    "Third-party damage",
    "Vegetation",
    "Under investigation",
];

/// Incident count for the log.
const INCIDENTS: usize = 160;

pub fn generate_incidents(rng: &mut StdRng) -> Vec<Incident> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid start date");
    let divisions = crate::demo::cities::divisions();

    (1..=INCIDENTS)
        .map(|index| {
            let date = start + Duration::days(rng.gen_range(0..365));
            let severity = match rng.gen_range(0..100) {
                0..=44 => "low",
                45..=74 => "medium",
                75..=92 => "high",
                _ => "critical",
            };
            Incident {
                incident_id: format!("INC-{}-{:04}", date.format("%Y"), index),
                date: date.format("%Y-%m-%d").to_string(),
                time: format!("{:02}:{:02}", rng.gen_range(0..24), rng.gen_range(0..60)),
                region: REGIONS[rng.gen_range(0..REGIONS.len())].to_string(),
                division: divisions[rng.gen_range(0..divisions.len())].to_string(),
                incident_type: INCIDENT_TYPES[rng.gen_range(0..INCIDENT_TYPES.len())].to_string(),
                severity: severity.to_string(),
                duration_minutes: rng.gen_range(15..480),
                affected_trains: rng.gen_range(0..25),
                resolved: if rng.gen_range(0..100) < 90 { "yes" } else { "no" }.to_string(),
                cause: INCIDENT_CAUSES[rng.gen_range(0..INCIDENT_CAUSES.len())].to_string(),
            }
        })
        .collect()
}

/// KPI catalog: name, unit, base value, whether higher is better.
const KPI_CATALOG: &[(&str, &str, f64, bool)] = &[
    ("Passenger turnover", "bln pkm", 33.5, true),
    ("Freight turnover", "bln tkm", 66.0, true),
    ("On-time departures", "%", 93.0, true),
    ("Average freight speed", "km/h", 42.0, true),
    ("Energy per gross tonne-km", "Wh", 10.8, false),
    ("Accidents per mln train-km", "count", 0.21, false),
    ("Staff productivity", "k tkm/employee", 415.0, true),
];

const QUARTERS: &[(i64, &str)] = &[
    (2024, "Q1"),
    (2024, "Q2"),
    (2024, "Q3"),
    (2024, "Q4"),
    (2025, "Q1"),
    (2025, "Q2"),
];

pub fn generate_kpi_metrics(rng: &mut StdRng) -> Vec<KpiMetric> {
    let mut metrics = Vec::new();
    for (year, quarter) in QUARTERS {
        for (name, unit, base, higher_is_better) in KPI_CATALOG {
            let value = round2(base * rng.gen_range(0.93..1.07));
            let target = round2(base * if *higher_is_better { 1.02 } else { 0.98 });
            let met = if *higher_is_better { value >= target } else { value <= target };
            metrics.push(KpiMetric {
                year: *year,
                quarter: quarter.to_string(),
                metric_name: name.to_string(),
                metric_value: value,
                unit: unit.to_string(),
                yoy_change_pct: round1(rng.gen_range(-4.0..6.0)),
                target_value: target,
                target_met: if met { "yes" } else { "no" }.to_string(),
            });
        }
    }
    metrics
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn monthly_covers_two_years() {
        let mut rng = StdRng::seed_from_u64(42);
        let stats = generate_monthly_stats(&mut rng);
        assert_eq!(stats.len(), 24);
        assert_eq!(stats[0].year, 2024);
        assert_eq!(stats[0].month, 1);
        assert_eq!(stats[23].year, 2025);
        assert_eq!(stats[23].month, 12);
        for stat in &stats {
            assert!(stat.on_time_pct >= 80.0 && stat.on_time_pct <= 99.5);
        }
    }

    #[test]
    fn cargo_shares_sum_to_one_hundred() {
        let mut rng = StdRng::seed_from_u64(42);
        let cargo = generate_cargo_types(&mut rng);
        assert_eq!(cargo.len(), COMMODITIES.len());
        let total: f64 = cargo.iter().map(|c| c.share_pct).sum();
        assert!((total - 100.0).abs() < 1.0, "shares sum to {}", total);
    }

    #[test]
    fn daily_operations_cover_every_region_and_service() {
        let mut rng = StdRng::seed_from_u64(42);
        let operations = generate_daily_operations(&mut rng);
        assert_eq!(
            operations.len() as i64,
            DAILY_DAYS * (REGIONS.len() * SERVICES.len()) as i64
        );
        let freight_passengers: f64 = operations
            .iter()
            .filter(|o| o.service == "Freight")
            .map(|o| o.passengers_thousands)
            .sum();
        assert_eq!(freight_passengers, 0.0);
    }

    #[test]
    fn incident_ids_are_unique_and_dated() {
        let mut rng = StdRng::seed_from_u64(42);
        let incidents = generate_incidents(&mut rng);
        assert_eq!(incidents.len(), INCIDENTS);
        let ids: std::collections::HashSet<&str> =
            incidents.iter().map(|i| i.incident_id.as_str()).collect();
        assert_eq!(ids.len(), incidents.len());
        for incident in &incidents {
            assert!(incident.date.starts_with("202"));
            assert!(["low", "medium", "high", "critical"].contains(&incident.severity.as_str()));
        }
    }

    #[test]
    fn kpis_judge_targets_by_direction() {
        let mut rng = StdRng::seed_from_u64(42);
        let metrics = generate_kpi_metrics(&mut rng);
        assert_eq!(metrics.len(), QUARTERS.len() * KPI_CATALOG.len());
        for metric in &metrics {
            let higher_is_better = KPI_CATALOG
                .iter()
                .find(|entry| entry.0 == metric.metric_name)
                .unwrap()
                .3;
            let expected = if higher_is_better {
                metric.metric_value >= metric.target_value
            } else {
                metric.metric_value <= metric.target_value
            };
            assert_eq!(metric.target_met == "yes", expected, "{:?}", metric);
        }
    }
}
