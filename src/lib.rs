//! # Fuel Router
//!
//! Fuel stop optimization along driving routes.
//!
//! Given a route polyline and a catalog of fuel stations with prices, this
//! library computes a sequence of refueling stops that gets the vehicle to
//! its destination without running dry, minimizing either local price per
//! stop (greedy) or total trip cost (exact discretized shortest-path).
//!
//! This library provides:
//! - Route geometry simplification for dense provider polylines
//! - Station-to-route proximity filtering with along-route distances
//! - Two interchangeable planners: a fast greedy heuristic and an exact
//!   Dijkstra search over discretized fuel levels
//!
//! Geocoding, route retrieval and station catalog storage are the caller's
//! concern; the core consumes plain value records and returns plain value
//! records.
//!
//! ## Quick Start
//!
//! ```rust
//! use fuel_router::{plan_route, PlanRequest, Route, RoutePoint, Station, VehicleProfile};
//!
//! // A ~667 km drive east along the equator, one refueling candidate.
//! let route = Route::from_points(
//!     (0..=60).map(|i| RoutePoint::new(i as f64 * 0.1, 0.0)).collect(),
//! );
//! let stations = vec![
//!     Station::new(1, "Halfway Fuel", "1 Equator Rd", 0.0, 3.0, 3.25),
//! ];
//!
//! let plan = plan_route(
//!     &route,
//!     &stations,
//!     &VehicleProfile::default(),
//!     &PlanRequest::default(),
//! )
//! .expect("route is feasible");
//!
//! assert_eq!(plan.stops.len(), 1);
//! assert!(plan.total_cost > 0.0);
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{PlanError, Result};

// Geographic utilities (distance, cumulative route distance, segment projection)
pub mod geo_utils;

// Route geometry simplification
pub mod simplify;
pub use simplify::simplify_route;

// Station-to-route proximity filtering
pub mod proximity;
pub use proximity::{filter_stations, ProximityFilter};

// Planner instrumentation (injectable checkpoint observer)
pub mod observer;
pub use observer::{LogObserver, NullObserver, PlanObserver};

// Fuel-stop planners (greedy heuristic and exact discretized search)
pub mod planner;
pub use planner::exact::plan_exact;
pub use planner::greedy::plan_greedy;
pub use planner::{
    plan_route, plan_route_with_config, plan_route_with_observer, EdgeMode, ExactConfig,
    GreedyConfig, PlannerConfig,
};

// ============================================================================
// Core Types
// ============================================================================

/// A point on a route polyline, in (longitude, latitude) order as routing
/// providers deliver geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl RoutePoint {
    /// Create a new route point from (longitude, latitude).
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Check that the point has finite, in-range coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box for a route polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Create bounds from route points. `None` for an empty polyline.
    pub fn from_points(points: &[RoutePoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lon = min_lon.min(p.longitude);
            max_lon = max_lon.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> RoutePoint {
        RoutePoint::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Grow the box by `km` on every side, converting kilometres to degrees
    /// with 111 km/° latitude and `111·cos(avgLat)` km/° longitude.
    pub fn expanded_by_km(&self, km: f64) -> Self {
        let avg_lat = (self.min_lat + self.max_lat) / 2.0;
        let lat_delta = km / geo_utils::KM_PER_DEGREE;
        let lon_delta = km / (geo_utils::KM_PER_DEGREE * avg_lat.to_radians().cos());
        Self {
            min_lat: self.min_lat - lat_delta,
            max_lat: self.max_lat + lat_delta,
            min_lon: self.min_lon - lon_delta,
            max_lon: self.max_lon + lon_delta,
        }
    }
}

/// A route to plan over: the ordered polyline plus the provider-reported
/// total distance in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Ordered (longitude, latitude) polyline.
    pub points: Vec<RoutePoint>,
    /// Total route distance in meters.
    pub total_distance_m: f64,
}

impl Route {
    /// Create a route from a polyline and a provider-reported distance.
    pub fn new(points: Vec<RoutePoint>, total_distance_m: f64) -> Self {
        Self {
            points,
            total_distance_m,
        }
    }

    /// Create a route from a polyline alone, deriving the total distance
    /// from the geometry.
    pub fn from_points(points: Vec<RoutePoint>) -> Self {
        let total_distance_m = geo_utils::polyline_length_km(&points) * 1000.0;
        Self {
            points,
            total_distance_m,
        }
    }

    /// Total route distance in kilometres.
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_m / 1000.0
    }
}

/// A fuel station record as normalized from any catalog source.
///
/// This is the adapter boundary for station input: database rows, JSON
/// payloads or fixtures are all converted into this one shape before the
/// core sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Price per fuel unit; must be positive.
    pub price_per_unit: f64,
}

impl Station {
    /// Normalize a station record from any source.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
        price_per_unit: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
            price_per_unit,
        }
    }
}

/// A station annotated by the proximity filter with its route distances.
///
/// Planners only ever see stations in this form: within the caller's offset
/// threshold, carrying both derived distance fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStation {
    pub station: Station,
    /// Cumulative route distance to the closest segment, km. Sort key.
    pub distance_along_route_km: f64,
    /// Perpendicular offset from the route, km.
    pub distance_from_route_km: f64,
}

/// Vehicle fuel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    /// Tank capacity in fuel units.
    pub tank_capacity: f64,
    /// Distance covered per fuel unit, in kilometres.
    pub economy: f64,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            tank_capacity: 50.0,
            economy: 10.0,
        }
    }
}

impl VehicleProfile {
    /// Maximum distance on a full tank, km.
    pub fn max_range_km(&self) -> f64 {
        self.tank_capacity * self.economy
    }
}

/// Fuel-stop optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Drive to the cheapest reachable station, refuel, repeat. Fast, not
    /// globally cost-optimal.
    #[default]
    Greedy,
    /// Discretized shortest-path search; cost-optimal with respect to the
    /// fuel step size.
    #[serde(alias = "dijkstra")]
    Exact,
}

impl Algorithm {
    /// Parse an algorithm selector leniently: unrecognized values fall back
    /// to greedy with a logged warning rather than failing the request.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "greedy" => Algorithm::Greedy,
            "exact" | "dijkstra" => Algorithm::Exact,
            other => {
                warn!("unknown algorithm '{}', using greedy", other);
                Algorithm::Greedy
            }
        }
    }
}

/// Parameters of a single planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Maximum station offset from the route, km. Default: 5.0.
    pub max_offset_km: f64,
    /// Optimization algorithm. Default: greedy.
    pub algorithm: Algorithm,
    /// Fuel in tank at the start, units; `None` means a full tank.
    pub initial_fuel: Option<f64>,
    /// Simplification budget for the route polyline. Default: 300.
    pub max_route_points: usize,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            max_offset_km: 5.0,
            algorithm: Algorithm::Greedy,
            initial_fuel: None,
            max_route_points: 300,
        }
    }
}

/// A scheduled refueling stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub station_id: u64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_unit: f64,
    pub distance_along_route_km: f64,
    pub distance_from_route_km: f64,
    /// Fuel in tank on arrival, units.
    pub arrival_fuel: f64,
    /// Fuel purchased here, units.
    pub purchased: f64,
    /// `purchased × price_per_unit`.
    pub cost: f64,
}

impl Stop {
    pub(crate) fn from_station(station: &RouteStation, arrival_fuel: f64, purchased: f64) -> Self {
        Self {
            station_id: station.station.id,
            name: station.station.name.clone(),
            address: station.station.address.clone(),
            latitude: station.station.latitude,
            longitude: station.station.longitude,
            price_per_unit: station.station.price_per_unit,
            distance_along_route_km: station.distance_along_route_km,
            distance_from_route_km: station.distance_from_route_km,
            arrival_fuel,
            purchased,
            cost: purchased * station.station.price_per_unit,
        }
    }
}

/// The planning result: stops in route order plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Selected stops, strictly increasing in distance along the route.
    pub stops: Vec<Stop>,
    /// Sum of all stop costs.
    pub total_cost: f64,
    /// Sum of all purchased amounts, units.
    pub total_purchased: f64,
    /// True when no station passed the proximity filter and the totals are
    /// a fleet-average estimate rather than a concrete stop schedule.
    pub estimated: bool,
}

impl Plan {
    /// An empty, zero-cost plan (degenerate geometry, or no stops needed).
    pub fn empty() -> Self {
        Self {
            stops: Vec::new(),
            total_cost: 0.0,
            total_purchased: 0.0,
            estimated: false,
        }
    }

    /// Build a plan from planner stops, summing the totals.
    pub fn from_stops(stops: Vec<Stop>) -> Self {
        let total_cost = stops.iter().map(|s| s.cost).sum();
        let total_purchased = stops.iter().map(|s| s.purchased).sum();
        Self {
            stops,
            total_cost,
            total_purchased,
            estimated: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_route() -> Vec<RoutePoint> {
        vec![
            RoutePoint::new(-0.1278, 51.5074),
            RoutePoint::new(-0.1290, 51.5080),
            RoutePoint::new(-0.1300, 51.5090),
            RoutePoint::new(-0.1310, 51.5100),
            RoutePoint::new(-0.1320, 51.5110),
        ]
    }

    #[test]
    fn test_route_point_validation() {
        assert!(RoutePoint::new(-0.1278, 51.5074).is_valid());
        assert!(!RoutePoint::new(0.0, 91.0).is_valid());
        assert!(!RoutePoint::new(181.0, 0.0).is_valid());
        assert!(!RoutePoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points(&sample_route()).unwrap();
        assert_eq!(bounds.min_lon, -0.1320);
        assert_eq!(bounds.max_lon, -0.1278);
        assert_eq!(bounds.min_lat, 51.5074);
        assert_eq!(bounds.max_lat, 51.5110);
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_expansion() {
        let bounds = Bounds::from_points(&sample_route()).unwrap();
        let expanded = bounds.expanded_by_km(5.0);
        assert!(expanded.min_lat < bounds.min_lat);
        assert!(expanded.max_lat > bounds.max_lat);
        assert!(expanded.min_lon < bounds.min_lon);
        assert!(expanded.max_lon > bounds.max_lon);
        // 5 km is ~0.045° of latitude.
        assert!((bounds.min_lat - expanded.min_lat - 0.045).abs() < 0.001);
    }

    #[test]
    fn test_route_from_points_derives_distance() {
        let route = Route::from_points(sample_route());
        assert!(route.total_distance_m > 0.0);
        assert!((route.total_distance_km() - route.total_distance_m / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_algorithm_parse_and_fallback() {
        assert_eq!(Algorithm::from_name("greedy"), Algorithm::Greedy);
        assert_eq!(Algorithm::from_name("Exact"), Algorithm::Exact);
        assert_eq!(Algorithm::from_name("dijkstra"), Algorithm::Exact);
        assert_eq!(Algorithm::from_name("simulated-annealing"), Algorithm::Greedy);
    }

    #[test]
    fn test_vehicle_profile_defaults() {
        let profile = VehicleProfile::default();
        assert_eq!(profile.tank_capacity, 50.0);
        assert_eq!(profile.economy, 10.0);
        assert_eq!(profile.max_range_km(), 500.0);
    }

    #[test]
    fn test_plan_from_stops_totals() {
        let station = RouteStation {
            station: Station::new(1, "S1", "addr", 0.0, 1.0, 3.0),
            distance_along_route_km: 100.0,
            distance_from_route_km: 0.2,
        };
        let stops = vec![
            Stop::from_station(&station, 10.0, 20.0),
            Stop::from_station(&station, 5.0, 10.0),
        ];
        let plan = Plan::from_stops(stops);
        assert_eq!(plan.total_purchased, 30.0);
        assert_eq!(plan.total_cost, 90.0);
        assert!(!plan.estimated);
    }

    #[test]
    fn test_plan_serializes_to_json() {
        let station = RouteStation {
            station: Station::new(7, "Roadside", "99 Route 66", 35.0, -101.0, 3.15),
            distance_along_route_km: 240.0,
            distance_from_route_km: 1.3,
        };
        let plan = Plan::from_stops(vec![Stop::from_station(&station, 12.0, 25.0)]);

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"station_id\":7"));
        assert!(json.contains("\"estimated\":false"));

        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_plan_request_deserializes_algorithm_alias() {
        let request: PlanRequest = serde_json::from_str(
            r#"{
                "max_offset_km": 5.0,
                "algorithm": "dijkstra",
                "initial_fuel": null,
                "max_route_points": 300
            }"#,
        )
        .unwrap();
        assert_eq!(request.algorithm, Algorithm::Exact);
    }
}
