//! Exact fuel-stop optimization over a discretized fuel domain.
//!
//! Continuous fuel levels make an exact shortest-path formulation
//! infinite-state. Discretizing the tank into fixed-size steps yields a
//! finite `(station, fuel-steps)` space searched with Dijkstra's algorithm:
//! a "purchase" transition buys one step at the current station, a "drive"
//! transition moves to a later station spending the steps the leg needs.
//! The result is cost-optimal with respect to the discretized fuel domain.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{PlanError, Result};
use crate::observer::PlanObserver;
use crate::{RouteStation, Stop, VehicleProfile};

/// Slack for floating-point distance and capacity comparisons.
const DISTANCE_EPSILON: f64 = 1e-6;

/// Slack applied before rounding a fuel amount up to whole steps.
const STEP_EPSILON: f64 = 1e-9;

/// Edge materialization strategy for the station graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// Every reachable forward pair. O(n²) edges; optimal unconditionally.
    #[default]
    Complete,
    /// Only {immediate next, next strictly cheaper reachable, furthest
    /// reachable}, O(n) edges. Optimal for the classical unconstrained
    /// refueling problem; not re-proven under a finite discretized tank, so
    /// this is a performance mode rather than the default.
    Pruned,
}

/// Configuration for the exact planner.
#[derive(Debug, Clone)]
pub struct ExactConfig {
    /// Fuel discretization step, in fuel units.
    pub fuel_step: f64,
    /// Edge materialization strategy.
    pub edge_mode: EdgeMode,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            fuel_step: 0.02,
            edge_mode: EdgeMode::Complete,
        }
    }
}

/// One node of the virtual station sequence: the start, a candidate
/// station, or the destination. Fuel cannot be purchased at the virtual
/// endpoints (infinite price).
struct Node {
    distance_km: f64,
    price: f64,
    station: Option<usize>,
}

/// Heap entry ordered as a min-heap on cost.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SearchState {
    cost: f64,
    node: usize,
    fuel_steps: usize,
}

impl Eq for SearchState {}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.fuel_steps.cmp(&self.fuel_steps))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run the exact planner over filtered, distance-annotated stations.
///
/// `stations` must be sorted ascending by distance along the route. Fails
/// with [`PlanError::RouteUnreachable`] before the search when any
/// consecutive gap exceeds the vehicle's maximum range, or after it when
/// the initial fuel cannot bridge to the first purchase opportunity.
pub fn plan_exact(
    stations: &[RouteStation],
    profile: &VehicleProfile,
    route_length_km: f64,
    initial_fuel: f64,
    config: &ExactConfig,
    observer: &mut dyn PlanObserver,
) -> Result<Vec<Stop>> {
    let fuel_step = config.fuel_step;
    if !(fuel_step > 0.0) {
        return Err(PlanError::validation("fuel step must be positive"));
    }

    // Virtual sequence: start + candidates + destination.
    let mut nodes = Vec::with_capacity(stations.len() + 2);
    nodes.push(Node {
        distance_km: 0.0,
        price: f64::INFINITY,
        station: None,
    });
    for (index, station) in stations.iter().enumerate() {
        nodes.push(Node {
            distance_km: station.distance_along_route_km,
            price: station.station.price_per_unit,
            station: Some(index),
        });
    }
    nodes.push(Node {
        distance_km: route_length_km,
        price: f64::INFINITY,
        station: None,
    });
    let n = nodes.len();

    let max_range_km = profile.max_range_km();
    for index in 1..n {
        let gap_km = nodes[index].distance_km - nodes[index - 1].distance_km;
        if gap_km < -DISTANCE_EPSILON || gap_km - DISTANCE_EPSILON > max_range_km {
            observer.on_termination("gap between waypoints exceeds maximum range");
            return Err(PlanError::RouteUnreachable {
                position_km: nodes[index - 1].distance_km,
                gap_km,
                range_km: max_range_km,
            });
        }
    }

    let capacity_steps = steps_round(profile.tank_capacity, fuel_step);
    let initial_steps =
        steps_round(initial_fuel.min(profile.tank_capacity), fuel_step).min(capacity_steps);

    let edges = build_edges(&nodes, profile, capacity_steps, fuel_step, config.edge_mode);

    // Dense best-cost and parent tables over (node, fuel-steps); the state
    // space is small and fully enumerable upfront.
    let width = capacity_steps + 1;
    let mut best = vec![f64::INFINITY; n * width];
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; n * width];
    let slot = |node: usize, fuel: usize| node * width + fuel;

    let mut queue = BinaryHeap::new();
    best[slot(0, initial_steps)] = 0.0;
    queue.push(SearchState {
        cost: 0.0,
        node: 0,
        fuel_steps: initial_steps,
    });

    while let Some(SearchState {
        cost,
        node,
        fuel_steps,
    }) = queue.pop()
    {
        if cost > best[slot(node, fuel_steps)] {
            continue;
        }

        if node == n - 1 {
            let stops = reconstruct(
                &parent,
                width,
                node,
                fuel_steps,
                &nodes,
                stations,
                profile,
                fuel_step,
                observer,
            );
            observer.on_termination("reached destination with minimum cost");
            return Ok(stops);
        }

        // Purchase one fuel step at this node.
        if fuel_steps < capacity_steps && nodes[node].price.is_finite() {
            let next_cost = cost + nodes[node].price * fuel_step;
            let target = slot(node, fuel_steps + 1);
            if next_cost < best[target] {
                best[target] = next_cost;
                parent[target] = Some((node, fuel_steps));
                queue.push(SearchState {
                    cost: next_cost,
                    node,
                    fuel_steps: fuel_steps + 1,
                });
            }
        }

        // Drive to a later node.
        for &(next_node, needed_steps) in &edges[node] {
            if needed_steps > fuel_steps {
                continue;
            }
            let target = slot(next_node, fuel_steps - needed_steps);
            if cost < best[target] {
                best[target] = cost;
                parent[target] = Some((node, fuel_steps));
                queue.push(SearchState {
                    cost,
                    node: next_node,
                    fuel_steps: fuel_steps - needed_steps,
                });
            }
        }
    }

    observer.on_termination("search space exhausted");
    Err(PlanError::RouteUnreachable {
        position_km: 0.0,
        gap_km: if n > 1 { nodes[1].distance_km } else { 0.0 },
        range_km: initial_fuel * profile.economy,
    })
}

/// Materialize drive edges as `(target, fuel-steps required)` per node.
fn build_edges(
    nodes: &[Node],
    profile: &VehicleProfile,
    capacity_steps: usize,
    fuel_step: f64,
    edge_mode: EdgeMode,
) -> Vec<Vec<(usize, usize)>> {
    let n = nodes.len();
    let max_range_km = profile.max_range_km();

    // Furthest node reachable from each node on a full tank, via a sliding
    // window over the cumulative distances.
    let mut reachable_end = vec![0usize; n];
    let mut right = 0usize;
    for i in 0..n {
        if right < i {
            right = i;
        }
        while right + 1 < n
            && nodes[right + 1].distance_km - nodes[i].distance_km
                <= max_range_km + DISTANCE_EPSILON
        {
            right += 1;
        }
        reachable_end[i] = right;
    }

    let mut edges: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    let push_edge = |edges: &mut Vec<Vec<(usize, usize)>>, from: usize, to: usize| {
        if to <= from {
            return;
        }
        let gap_km = nodes[to].distance_km - nodes[from].distance_km;
        let needed_steps = steps_ceil(gap_km / profile.economy, fuel_step);
        if needed_steps > capacity_steps {
            return;
        }
        edges[from].push((to, needed_steps));
    };

    match edge_mode {
        EdgeMode::Complete => {
            for i in 0..n - 1 {
                for j in i + 1..=reachable_end[i] {
                    push_edge(&mut edges, i, j);
                }
            }
        }
        EdgeMode::Pruned => {
            // Next strictly cheaper node ahead, via a monotonic stack
            // scanned from the end; the virtual endpoints never enter the
            // stack (infinite price).
            let mut next_cheaper = vec![None; n];
            let mut stack: Vec<usize> = Vec::new();
            for i in (0..n).rev() {
                while let Some(&top) = stack.last() {
                    if nodes[i].price <= nodes[top].price {
                        stack.pop();
                    } else {
                        break;
                    }
                }
                next_cheaper[i] = stack.last().copied();
                if nodes[i].price.is_finite() {
                    stack.push(i);
                }
            }

            for i in 0..n - 1 {
                let furthest = reachable_end[i];
                if furthest <= i {
                    continue;
                }
                let mut candidates = vec![i + 1, furthest];
                if let Some(cheaper) = next_cheaper[i] {
                    if cheaper <= furthest {
                        candidates.push(cheaper);
                    }
                }
                if furthest >= n - 1 {
                    candidates.push(n - 1);
                }
                candidates.sort_unstable();
                candidates.dedup();
                for candidate in candidates {
                    push_edge(&mut edges, i, candidate);
                }
            }
        }
    }

    edges
}

/// Walk the parent table back from the destination state and coalesce
/// consecutive purchases at the same station into single stops.
#[allow(clippy::too_many_arguments)]
fn reconstruct(
    parent: &[Option<(usize, usize)>],
    width: usize,
    node: usize,
    fuel_steps: usize,
    nodes: &[Node],
    stations: &[RouteStation],
    profile: &VehicleProfile,
    fuel_step: f64,
    observer: &mut dyn PlanObserver,
) -> Vec<Stop> {
    let mut chain = vec![(node, fuel_steps)];
    let mut current = (node, fuel_steps);
    while let Some(previous) = parent[current.0 * width + current.1] {
        chain.push(previous);
        current = previous;
    }
    chain.reverse();

    // Drive edges only go forward, so each node occupies one contiguous run
    // of the chain; the run's fuel delta is the amount purchased there.
    let mut stops = Vec::new();
    let mut k = 0;
    while k < chain.len() {
        let (run_node, arrival_steps) = chain[k];
        let mut end = k;
        while end + 1 < chain.len() && chain[end + 1].0 == run_node {
            end += 1;
        }
        if let Some(station_index) = nodes[run_node].station {
            let purchased_steps = chain[end].1 - arrival_steps;
            if purchased_steps > 0 {
                let station = &stations[station_index];
                let arrival_fuel =
                    (arrival_steps as f64 * fuel_step).clamp(0.0, profile.tank_capacity);
                let purchased = purchased_steps as f64 * fuel_step;
                observer.on_stop_selected(station, purchased);
                stops.push(Stop::from_station(station, arrival_fuel, purchased));
            }
        }
        k = end + 1;
    }
    stops
}

/// Fuel units to whole steps, rounding to nearest.
fn steps_round(units: f64, fuel_step: f64) -> usize {
    (units / fuel_step).round().max(0.0) as usize
}

/// Fuel units to whole steps, rounding up so an edge never arrives
/// fractionally short.
fn steps_ceil(units: f64, fuel_step: f64) -> usize {
    (units / fuel_step - STEP_EPSILON).ceil().max(0.0) as usize
}
