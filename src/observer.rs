//! Planner instrumentation.
//!
//! The optimizers report progress through an injectable observer rather
//! than logging from inside their loops, so the search logic carries no
//! global state and can be exercised in isolation. [`LogObserver`] forwards
//! every checkpoint to the `log` facade and is what [`crate::plan_route`]
//! installs by default.

use log::{debug, info};

use crate::RouteStation;

/// Checkpoint observer for planner runs.
///
/// Every hook has a no-op default, so implementors override only the
/// checkpoints they care about. The greedy planner reports each iteration;
/// the exact planner reports selected stops and termination.
pub trait PlanObserver {
    /// A planner iteration begins at `position_km` with `fuel` units in tank.
    fn on_iteration(&mut self, _position_km: f64, _fuel: f64) {}

    /// A station was selected for refueling.
    fn on_stop_selected(&mut self, _station: &RouteStation, _purchased: f64) {}

    /// The planner terminated, successfully or not.
    fn on_termination(&mut self, _reason: &str) {}
}

/// Observer that forwards checkpoints to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PlanObserver for LogObserver {
    fn on_iteration(&mut self, position_km: f64, fuel: f64) {
        debug!(
            "planner iteration: position {:.2} km, fuel {:.2} units",
            position_km, fuel
        );
    }

    fn on_stop_selected(&mut self, station: &RouteStation, purchased: f64) {
        info!(
            "selected stop '{}' at {:.2} km (price {:.4}): purchasing {:.2} units",
            station.station.name,
            station.distance_along_route_km,
            station.station.price_per_unit,
            purchased
        );
    }

    fn on_termination(&mut self, reason: &str) {
        info!("planner finished: {}", reason);
    }
}

/// Observer that discards every checkpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl PlanObserver for NullObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RouteStation, Station};

    #[derive(Default)]
    struct CountingObserver {
        iterations: usize,
        stops: usize,
        terminations: usize,
    }

    impl PlanObserver for CountingObserver {
        fn on_iteration(&mut self, _position_km: f64, _fuel: f64) {
            self.iterations += 1;
        }

        fn on_stop_selected(&mut self, _station: &RouteStation, _purchased: f64) {
            self.stops += 1;
        }

        fn on_termination(&mut self, _reason: &str) {
            self.terminations += 1;
        }
    }

    #[test]
    fn test_counting_observer_receives_checkpoints() {
        let station = RouteStation {
            station: Station::new(1, "Stop A", "1 Main St", 40.0, -100.0, 3.0),
            distance_along_route_km: 10.0,
            distance_from_route_km: 0.5,
        };

        let mut observer = CountingObserver::default();
        observer.on_iteration(0.0, 50.0);
        observer.on_stop_selected(&station, 12.0);
        observer.on_termination("done");

        assert_eq!(observer.iterations, 1);
        assert_eq!(observer.stops, 1);
        assert_eq!(observer.terminations, 1);
    }
}
