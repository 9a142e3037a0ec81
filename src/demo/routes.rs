use itertools::Itertools;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::{json, Value};

use crate::model::{RailRoute, Station};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// How many nearest neighbors each central station is connected to.
const NEIGHBORS: usize = 4;

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Connect each central station to its nearest neighbors. Routes are
/// bidirectional, so the pair is emitted only when origin id < destination
/// id; that keeps A->B and B->A from both appearing.
pub fn generate_routes(stations: &[Station], rng: &mut StdRng) -> Vec<RailRoute> {
    let centrals: Vec<&Station> = stations.iter().filter(|s| s.station_class == 1).collect();
    let mut routes = Vec::new();
    let mut route_id = 1i64;

    for origin in &centrals {
        let nearest = centrals
            .iter()
            .filter(|dest| dest.id != origin.id)
            .map(|dest| {
                let km = haversine_km(
                    origin.latitude,
                    origin.longitude,
                    dest.latitude,
                    dest.longitude,
                );
                (*dest, km)
            })
            .sorted_by(|a, b| a.1.total_cmp(&b.1))
            .take(NEIGHBORS);

        for (dest, km) in nearest {
            if origin.id >= dest.id {
                continue;
            }
            let geometry = json!({
                "type": "LineString",
                "coordinates": [
                    [origin.longitude, origin.latitude],
                    [dest.longitude, dest.latitude],
                ],
            });
            routes.push(RailRoute {
                id: route_id,
                origin_id: origin.id,
                origin_name: origin.name.clone(),
                dest_id: dest.id,
                dest_name: dest.name.clone(),
                distance_km: (km * 10.0).round() / 10.0,
                trains_per_day: rng.gen_range(2..=20),
                geometry: geometry.to_string(),
            });
            route_id += 1;
        }
    }

    routes
}

/// GeoJSON overlay of the network for map visualizations, with randomized
/// load figures per corridor.
pub fn route_overlay(routes: &[RailRoute], rng: &mut StdRng) -> Value {
    let features: Vec<Value> = routes
        .iter()
        .map(|route| {
            let load_percent: i64 = rng.gen_range(30..=95);
            let capacity = *[50, 80, 100, 120]
                .get(rng.gen_range(0..4))
                .expect("fixed capacity table");
            let geometry: Value =
                serde_json::from_str(&route.geometry).expect("route geometry is generated JSON");
            json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "id": route.id,
                    "origin": route.origin_name,
                    "destination": route.dest_name,
                    "distance_km": route.distance_km,
                    "trains_per_day": route.trains_per_day,
                    "load_percent": load_percent,
                    "capacity_mln_tons": capacity,
                    "status": if load_percent > 85 { "Critical" } else { "Normal" },
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::stations::generate_stations;
    use rand::SeedableRng;

    #[test]
    fn haversine_knows_paris_to_lyon() {
        // Roughly 390 km as the crow flies.
        let km = haversine_km(48.8566, 2.3522, 45.7640, 4.8357);
        assert!((km - 392.0).abs() < 10.0, "got {}", km);
    }

    #[test]
    fn haversine_is_zero_for_identical_points() {
        assert!(haversine_km(52.52, 13.405, 52.52, 13.405) < 1e-9);
    }

    #[test]
    fn routes_connect_only_central_stations() {
        let mut rng = StdRng::seed_from_u64(42);
        let stations = generate_stations(&mut rng);
        let routes = generate_routes(&stations, &mut rng);
        assert!(!routes.is_empty());
        let centrals: std::collections::HashSet<i64> = stations
            .iter()
            .filter(|s| s.station_class == 1)
            .map(|s| s.id)
            .collect();
        for route in &routes {
            assert!(centrals.contains(&route.origin_id));
            assert!(centrals.contains(&route.dest_id));
        }
    }

    #[test]
    fn no_duplicate_direction_pairs() {
        let mut rng = StdRng::seed_from_u64(42);
        let stations = generate_stations(&mut rng);
        let routes = generate_routes(&stations, &mut rng);
        let mut seen = std::collections::HashSet::new();
        for route in &routes {
            assert!(route.origin_id < route.dest_id);
            assert!(seen.insert((route.origin_id, route.dest_id)), "duplicate pair");
        }
    }

    #[test]
    fn route_ids_are_sequential() {
        let mut rng = StdRng::seed_from_u64(42);
        let stations = generate_stations(&mut rng);
        let routes = generate_routes(&stations, &mut rng);
        for (i, route) in routes.iter().enumerate() {
            assert_eq!(route.id, i as i64 + 1);
        }
    }

    #[test]
    fn overlay_flags_overloaded_corridors() {
        let mut rng = StdRng::seed_from_u64(42);
        let stations = generate_stations(&mut rng);
        let routes = generate_routes(&stations, &mut rng);
        let overlay = route_overlay(&routes, &mut rng);
        assert_eq!(overlay["type"], "FeatureCollection");
        let features = overlay["features"].as_array().unwrap();
        assert_eq!(features.len(), routes.len());
        for feature in features {
            let load = feature["properties"]["load_percent"].as_i64().unwrap();
            let status = feature["properties"]["status"].as_str().unwrap();
            assert_eq!(status == "Critical", load > 85);
            assert_eq!(feature["geometry"]["type"], "LineString");
        }
    }
}
