//! Geographic utilities: geodesic distance, cumulative along-route distance
//! and fast planar point-to-segment math.
//!
//! Along-route distances are geodesic (haversine); the point-to-segment
//! distance used by the proximity filter is a planar equirectangular
//! approximation, chosen because it is O(1) per segment versus an iterative
//! geodesic solve.

use geo::{Distance, Haversine, Point};

use crate::RoutePoint;

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(a: &RoutePoint, b: &RoutePoint) -> f64 {
    Haversine::distance(
        Point::new(a.longitude, a.latitude),
        Point::new(b.longitude, b.latitude),
    )
}

/// Total length of a polyline in kilometres.
pub fn polyline_length_km(points: &[RoutePoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum::<f64>()
        / 1000.0
}

/// Cumulative great-circle distance in kilometres from the first point of
/// the polyline to the point at `index`.
///
/// O(index) per call; callers that query repeatedly should precompute
/// [`prefix_distances_km`] instead. An `index` past the end is a programming
/// error; it debug-asserts and saturates to the last point in release.
pub fn distance_along_route_km(points: &[RoutePoint], index: usize) -> f64 {
    debug_assert!(
        points.is_empty() || index < points.len(),
        "index {} out of range for polyline of {} points",
        index,
        points.len()
    );
    if points.len() < 2 {
        return 0.0;
    }
    let end = index.min(points.len() - 1);
    points[..=end]
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum::<f64>()
        / 1000.0
}

/// Cumulative distance in kilometres from the first point to every point of
/// the polyline. `result[0]` is 0; `result.len() == points.len()`.
pub fn prefix_distances_km(points: &[RoutePoint]) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(points.len());
    let mut accumulated = 0.0;
    prefix.push(0.0);
    for pair in points.windows(2) {
        accumulated += haversine_distance(&pair[0], &pair[1]) / 1000.0;
        prefix.push(accumulated);
    }
    // An empty polyline yields an empty prefix, not a lone zero.
    prefix.truncate(points.len());
    prefix
}

/// Distance in kilometres from `point` to the segment `a`-`b`, using an
/// equirectangular projection centered on the segment.
///
/// Latitude/longitude deltas are scaled to kilometres with 111 km/° latitude
/// and `111·cos(lat)` km/° longitude, the point is projected onto the
/// segment and the projection parameter clamped to [0, 1] so endpoint cases
/// fall back to point distance.
pub fn point_to_segment_km(point: &RoutePoint, a: &RoutePoint, b: &RoutePoint) -> f64 {
    let lat_scale = KM_PER_DEGREE;
    let lon_scale = KM_PER_DEGREE * point.latitude.to_radians().cos();

    // Project into km space with `a` as the origin.
    let px = (point.longitude - a.longitude) * lon_scale;
    let py = (point.latitude - a.latitude) * lat_scale;
    let bx = (b.longitude - a.longitude) * lon_scale;
    let by = (b.latitude - a.latitude) * lat_scale;

    let segment_len_sq = bx * bx + by * by;
    if segment_len_sq == 0.0 {
        // Degenerate segment: distance to the point `a`.
        return (px * px + py * py).sqrt();
    }

    let t = ((px * bx + py * by) / segment_len_sq).clamp(0.0, 1.0);
    let dx = px - t * bx;
    let dy = py - t * by;
    (dx * dx + dy * dy).sqrt()
}
