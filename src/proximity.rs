//! Station-to-route proximity filtering.
//!
//! Every candidate station passes through two gates before the planners see
//! it: a cheap expanded-bounding-box reject, then a nearest-segment scan
//! that yields the station's perpendicular offset from the route and its
//! distance along the route. Planners assume both annotations are present
//! and the offset is within the caller's threshold.

use log::{debug, info};
use rstar::{Envelope, AABB};

use crate::geo_utils::{point_to_segment_km, prefix_distances_km};
use crate::{Bounds, RoutePoint, RouteStation, Station};

/// A station this close to a segment ends the scan early; no sensible
/// threshold rejects it.
const CLOSE_ENOUGH_KM: f64 = 0.05;

/// Routes with at most this many segments are scanned exhaustively.
const FULL_SCAN_SEGMENTS: usize = 500;

/// Above this segment count the stride is chosen to examine ~1000 segments.
const WIDE_SCAN_SEGMENTS: usize = 1000;

/// Proximity filter for one route, reusable across a station catalog.
///
/// Precomputes the expanded bounding envelope, the segment-scan stride and
/// the along-route prefix distances once, so the per-station work is a
/// bounded segment scan.
pub struct ProximityFilter<'a> {
    route: &'a [RoutePoint],
    envelope: AABB<[f64; 2]>,
    prefix_km: Vec<f64>,
    stride: usize,
    threshold_km: f64,
}

impl<'a> ProximityFilter<'a> {
    /// Build a filter for `route` with the given offset threshold in km.
    ///
    /// Returns `None` for degenerate routes (fewer than 2 points).
    pub fn new(route: &'a [RoutePoint], threshold_km: f64) -> Option<Self> {
        if route.len() < 2 {
            return None;
        }
        let bounds = Bounds::from_points(route)?.expanded_by_km(threshold_km);
        let envelope = AABB::from_corners(
            [bounds.min_lon, bounds.min_lat],
            [bounds.max_lon, bounds.max_lat],
        );

        let num_segments = route.len() - 1;
        let stride = if num_segments > WIDE_SCAN_SEGMENTS {
            (num_segments / WIDE_SCAN_SEGMENTS).max(1)
        } else if num_segments > FULL_SCAN_SEGMENTS {
            (num_segments / FULL_SCAN_SEGMENTS).max(1)
        } else {
            1
        };

        Some(Self {
            route,
            envelope,
            prefix_km: prefix_distances_km(route),
            stride,
            threshold_km,
        })
    }

    /// Annotate a single station with its route distances, or reject it.
    ///
    /// Rejection is either the O(1) envelope test or a scanned minimum
    /// offset above the threshold.
    pub fn annotate(&self, station: &Station) -> Option<RouteStation> {
        if !self
            .envelope
            .contains_point(&[station.longitude, station.latitude])
        {
            return None;
        }

        let station_point = RoutePoint::new(station.longitude, station.latitude);
        let num_segments = self.route.len() - 1;
        let mut min_dist_km = f64::INFINITY;
        let mut closest_segment = 0usize;

        let mut i = 0;
        while i < num_segments {
            let dist = point_to_segment_km(&station_point, &self.route[i], &self.route[i + 1]);
            if dist < min_dist_km {
                min_dist_km = dist;
                closest_segment = i;
            }
            if min_dist_km < CLOSE_ENOUGH_KM {
                break;
            }
            i += self.stride;
        }

        if min_dist_km > self.threshold_km {
            debug!(
                "station '{}' rejected: {:.2} km from route (threshold {:.2} km)",
                station.name, min_dist_km, self.threshold_km
            );
            return None;
        }

        Some(RouteStation {
            station: station.clone(),
            distance_along_route_km: self.prefix_km[closest_segment],
            distance_from_route_km: min_dist_km,
        })
    }

    /// Filter a whole catalog, returning kept stations sorted ascending by
    /// distance along the route.
    pub fn filter(&self, stations: &[Station]) -> Vec<RouteStation> {
        let mut kept = Vec::new();
        for (processed, station) in stations.iter().enumerate() {
            if (processed + 1) % 100 == 0 {
                info!(
                    "proximity filter: processed {}/{} stations",
                    processed + 1,
                    stations.len()
                );
            }
            if let Some(annotated) = self.annotate(station) {
                kept.push(annotated);
            }
        }
        kept.sort_by(|a, b| {
            a.distance_along_route_km
                .total_cmp(&b.distance_along_route_km)
        });
        info!(
            "proximity filter: kept {} of {} stations within {:.1} km of the route",
            kept.len(),
            stations.len(),
            self.threshold_km
        );
        kept
    }
}

/// Convenience wrapper: filter `stations` against `route` in one call.
///
/// Degenerate routes keep nothing.
pub fn filter_stations(
    stations: &[Station],
    route: &[RoutePoint],
    threshold_km: f64,
) -> Vec<RouteStation> {
    match ProximityFilter::new(route, threshold_km) {
        Some(filter) => filter.filter(stations),
        None => Vec::new(),
    }
}
