//! Fuel-stop planning entry points.
//!
//! The pipeline: validate the request, simplify the route geometry when it
//! exceeds the point budget, filter the station catalog down to candidates
//! near the route, then hand the annotated candidates to the selected
//! optimizer. When no station survives the filter the plan degrades to a
//! fleet-average cost estimate instead of failing.

pub mod exact;
pub mod greedy;

pub use exact::{EdgeMode, ExactConfig};
pub use greedy::GreedyConfig;

use log::info;

use crate::error::{PlanError, Result};
use crate::observer::{LogObserver, PlanObserver};
use crate::proximity::filter_stations;
use crate::simplify::simplify_route;
use crate::{Algorithm, Plan, PlanRequest, Route, Station, VehicleProfile};

/// Price per fuel unit assumed when estimating cost with an empty catalog.
const DEFAULT_ESTIMATE_PRICE: f64 = 3.50;

/// Per-algorithm tunables used by [`plan_route`].
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    pub greedy: GreedyConfig,
    pub exact: ExactConfig,
}

/// Plan fuel stops for `route`, logging planner checkpoints through the
/// `log` facade.
pub fn plan_route(
    route: &Route,
    stations: &[Station],
    profile: &VehicleProfile,
    request: &PlanRequest,
) -> Result<Plan> {
    plan_route_with_observer(route, stations, profile, request, &mut LogObserver)
}

/// Plan fuel stops for `route` with default algorithm tunables, reporting
/// planner checkpoints to `observer`.
pub fn plan_route_with_observer(
    route: &Route,
    stations: &[Station],
    profile: &VehicleProfile,
    request: &PlanRequest,
    observer: &mut dyn PlanObserver,
) -> Result<Plan> {
    plan_route_with_config(
        route,
        stations,
        profile,
        request,
        &PlannerConfig::default(),
        observer,
    )
}

/// Plan fuel stops for `route`.
///
/// Validation runs before any computation; degenerate geometry produces an
/// empty zero-cost plan; an empty candidate set after proximity filtering
/// produces an estimate plan (`estimated = true`). Everything else is
/// delegated to the algorithm selected by the request, tuned by `config`.
pub fn plan_route_with_config(
    route: &Route,
    stations: &[Station],
    profile: &VehicleProfile,
    request: &PlanRequest,
    config: &PlannerConfig,
    observer: &mut dyn PlanObserver,
) -> Result<Plan> {
    validate(profile, request)?;

    let total_km = route.total_distance_km();
    if route.points.len() < 2 || total_km <= 0.0 {
        info!(
            "degenerate route geometry ({} points, {:.2} km): returning empty plan",
            route.points.len(),
            total_km
        );
        return Ok(Plan::empty());
    }

    let geometry = if route.points.len() > request.max_route_points {
        simplify_route(&route.points, request.max_route_points)
    } else {
        route.points.clone()
    };

    let candidates = filter_stations(stations, &geometry, request.max_offset_km);
    if candidates.is_empty() {
        return Ok(estimate_plan(stations, profile, total_km));
    }

    let initial_fuel = request.initial_fuel.unwrap_or(profile.tank_capacity);
    let stops = match request.algorithm {
        Algorithm::Greedy => greedy::plan_greedy(
            &candidates,
            profile,
            total_km,
            initial_fuel,
            &config.greedy,
            observer,
        )?,
        Algorithm::Exact => exact::plan_exact(
            &candidates,
            profile,
            total_km,
            initial_fuel,
            &config.exact,
            observer,
        )?,
    };

    Ok(Plan::from_stops(stops))
}

fn validate(profile: &VehicleProfile, request: &PlanRequest) -> Result<()> {
    if !(profile.tank_capacity > 0.0) || !profile.tank_capacity.is_finite() {
        return Err(PlanError::validation("tank capacity must be positive"));
    }
    if !(profile.economy > 0.0) || !profile.economy.is_finite() {
        return Err(PlanError::validation("fuel economy must be positive"));
    }
    if !(request.max_offset_km > 0.0) || !request.max_offset_km.is_finite() {
        return Err(PlanError::validation(
            "max offset distance must be positive",
        ));
    }
    if request.max_route_points < 2 {
        return Err(PlanError::validation(
            "route point budget must be at least 2",
        ));
    }
    if let Some(initial_fuel) = request.initial_fuel {
        if !(0.0..=profile.tank_capacity).contains(&initial_fuel) {
            return Err(PlanError::validation(format!(
                "initial fuel {:.2} outside [0, {:.2}]",
                initial_fuel, profile.tank_capacity
            )));
        }
    }
    Ok(())
}

/// Degraded outcome when no station passes the proximity filter: estimate
/// the trip cost from the mean price of the originally queried catalog.
fn estimate_plan(catalog: &[Station], profile: &VehicleProfile, total_km: f64) -> Plan {
    let needed_units = total_km / profile.economy;
    let average_price = if catalog.is_empty() {
        DEFAULT_ESTIMATE_PRICE
    } else {
        catalog.iter().map(|s| s.price_per_unit).sum::<f64>() / catalog.len() as f64
    };
    info!(
        "no candidate stations near the route; estimating {:.2} units at average price {:.4}",
        needed_units, average_price
    );
    Plan {
        stops: Vec::new(),
        total_cost: needed_units * average_price,
        total_purchased: needed_units,
        estimated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoutePoint;

    /// Straight equatorial route of the given length in degrees, one point
    /// per 0.1°. At the equator a degree is ~111.2 km.
    fn route(degrees: f64) -> Route {
        let steps = (degrees * 10.0).round() as usize;
        let points: Vec<RoutePoint> = (0..=steps)
            .map(|i| RoutePoint::new(i as f64 * 0.1, 0.0))
            .collect();
        Route::from_points(points)
    }

    fn catalog() -> Vec<Station> {
        vec![
            Station::new(1, "Alpha", "1 First St", 0.0, 1.0, 3.2),
            Station::new(2, "Bravo", "2 Second St", 0.0, 2.5, 2.8),
            Station::new(3, "Charlie", "3 Third St", 0.0, 4.0, 3.6),
            Station::new(4, "Delta", "4 Fourth St", 0.0, 7.0, 3.0),
        ]
    }

    #[test]
    fn test_validation_rejects_bad_threshold() {
        let request = PlanRequest {
            max_offset_km: 0.0,
            ..PlanRequest::default()
        };
        let result = plan_route(
            &route(5.0),
            &catalog(),
            &VehicleProfile::default(),
            &request,
        );
        assert!(matches!(result, Err(PlanError::Validation { .. })));
    }

    #[test]
    fn test_validation_rejects_overfull_tank() {
        let request = PlanRequest {
            initial_fuel: Some(60.0),
            ..PlanRequest::default()
        };
        let result = plan_route(
            &route(5.0),
            &catalog(),
            &VehicleProfile::default(),
            &request,
        );
        assert!(matches!(result, Err(PlanError::Validation { .. })));
    }

    #[test]
    fn test_degenerate_geometry_returns_empty_plan() {
        let degenerate = Route::new(vec![RoutePoint::new(0.0, 0.0)], 0.0);
        let plan = plan_route(
            &degenerate,
            &catalog(),
            &VehicleProfile::default(),
            &PlanRequest::default(),
        )
        .unwrap();
        assert!(plan.stops.is_empty());
        assert_eq!(plan.total_cost, 0.0);
        assert!(!plan.estimated);
    }

    #[test]
    fn test_no_candidates_degrades_to_estimate() {
        // Stations are all far from the equatorial route.
        let far_catalog = vec![
            Station::new(1, "Far A", "far", 45.0, 1.0, 3.0),
            Station::new(2, "Far B", "far", 46.0, 2.0, 4.0),
        ];
        let plan = plan_route(
            &route(5.0),
            &far_catalog,
            &VehicleProfile::default(),
            &PlanRequest::default(),
        )
        .unwrap();
        assert!(plan.estimated);
        assert!(plan.stops.is_empty());
        // ~556 km at 10 km/unit, priced at the 3.5 average.
        let expected_units = route(5.0).total_distance_km() / 10.0;
        assert!((plan.total_purchased - expected_units).abs() < 1e-9);
        assert!((plan.total_cost - expected_units * 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_catalog_estimate_uses_default_price() {
        let plan = plan_route(
            &route(5.0),
            &[],
            &VehicleProfile::default(),
            &PlanRequest::default(),
        )
        .unwrap();
        assert!(plan.estimated);
        let expected_units = route(5.0).total_distance_km() / 10.0;
        assert!((plan.total_cost - expected_units * DEFAULT_ESTIMATE_PRICE).abs() < 1e-9);
    }

    #[test]
    fn test_full_pipeline_produces_stops() {
        // ~1111 km route with on-route stations; a full 500 km tank needs
        // at least two stops.
        let plan = plan_route(
            &route(10.0),
            &catalog(),
            &VehicleProfile::default(),
            &PlanRequest::default(),
        )
        .unwrap();
        assert!(!plan.estimated);
        assert!(!plan.stops.is_empty());
        let cost: f64 = plan.stops.iter().map(|s| s.cost).sum();
        assert!((plan.total_cost - cost).abs() < 1e-9);
        for pair in plan.stops.windows(2) {
            assert!(pair[0].distance_along_route_km < pair[1].distance_along_route_km);
        }
    }

    #[test]
    fn test_both_algorithms_deterministic() {
        for algorithm in [Algorithm::Greedy, Algorithm::Exact] {
            let request = PlanRequest {
                algorithm,
                ..PlanRequest::default()
            };
            let first = plan_route(
                &route(10.0),
                &catalog(),
                &VehicleProfile::default(),
                &request,
            )
            .unwrap();
            let second = plan_route(
                &route(10.0),
                &catalog(),
                &VehicleProfile::default(),
                &request,
            )
            .unwrap();
            assert_eq!(first, second);
        }
    }
}
