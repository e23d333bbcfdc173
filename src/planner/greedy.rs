//! Greedy fuel-stop selection.
//!
//! From the current position, drive to the cheapest station still in range,
//! refuel, repeat until the destination is reachable. Locally price-optimal
//! per decision; not guaranteed globally cost-optimal.

use crate::error::{PlanError, Result};
use crate::observer::PlanObserver;
use crate::{RouteStation, Stop, VehicleProfile};

/// Tunables for the greedy final-stop refuel reserve.
///
/// When the destination fits within one full tank from a stop, the planner
/// buys only what the remaining leg needs plus this reserve.
#[derive(Debug, Clone)]
pub struct GreedyConfig {
    /// Smallest reserve bought at the final stop, in fuel units.
    pub min_reserve: f64,
    /// Reserve as a fraction of the needed amount.
    pub reserve_fraction: f64,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self {
            min_reserve: 0.1,
            reserve_fraction: 0.05,
        }
    }
}

/// Run the greedy planner over filtered, distance-annotated stations.
///
/// `stations` must be sorted ascending by distance along the route (the
/// proximity filter's output order). Returns the selected stops in route
/// order, or [`PlanError::RouteUnreachable`] when neither the destination
/// nor any station is in range.
pub fn plan_greedy(
    stations: &[RouteStation],
    profile: &VehicleProfile,
    route_length_km: f64,
    initial_fuel: f64,
    config: &GreedyConfig,
    observer: &mut dyn PlanObserver,
) -> Result<Vec<Stop>> {
    let mut fuel = initial_fuel;
    let mut position_km = 0.0;
    let mut visited = vec![false; stations.len()];
    let mut stops = Vec::new();

    loop {
        observer.on_iteration(position_km, fuel);
        let range_km = fuel * profile.economy;
        let remaining_km = route_length_km - position_km;

        if remaining_km <= range_km {
            observer.on_termination("destination reachable with current fuel");
            return Ok(stops);
        }

        // Cheapest unvisited station strictly ahead and within range; ties
        // resolve to the first in route order.
        let mut best: Option<usize> = None;
        for (index, candidate) in stations.iter().enumerate() {
            if visited[index] {
                continue;
            }
            let ahead_km = candidate.distance_along_route_km - position_km;
            if ahead_km <= 0.0 || ahead_km > range_km {
                continue;
            }
            let cheaper = match best {
                Some(current) => {
                    candidate.station.price_per_unit
                        < stations[current].station.price_per_unit
                }
                None => true,
            };
            if cheaper {
                best = Some(index);
            }
        }

        let Some(chosen_index) = best else {
            let gap_km = stations
                .iter()
                .enumerate()
                .filter(|(index, s)| {
                    !visited[*index] && s.distance_along_route_km > position_km
                })
                .map(|(_, s)| s.distance_along_route_km - position_km)
                .fold(remaining_km, f64::min);
            observer.on_termination("no station reachable");
            return Err(PlanError::RouteUnreachable {
                position_km,
                gap_km,
                range_km,
            });
        };

        let chosen = &stations[chosen_index];
        let leg_km = chosen.distance_along_route_km - position_km;
        fuel -= leg_km / profile.economy;
        let arrival_fuel = fuel.clamp(0.0, profile.tank_capacity);

        let remaining_from_stop_km = route_length_km - chosen.distance_along_route_km;
        let purchased = if remaining_from_stop_km <= profile.max_range_km() {
            // Final stop: just enough to finish, plus the reserve.
            let needed = (remaining_from_stop_km / profile.economy - fuel).max(0.0);
            let reserve = (needed * config.reserve_fraction).max(config.min_reserve);
            (needed + reserve).min(profile.tank_capacity - fuel)
        } else {
            profile.tank_capacity - fuel
        };

        fuel += purchased;
        observer.on_stop_selected(chosen, purchased);
        stops.push(Stop::from_station(chosen, arrival_fuel, purchased));
        visited[chosen_index] = true;
        position_km = chosen.distance_along_route_km;
    }
}
