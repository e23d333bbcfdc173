//! Route geometry simplification.
//!
//! Reduces the point count of a dense provider polyline while keeping the
//! endpoints and every direction change sharper than a threshold, so the
//! proximity filter scans far fewer segments without visibly distorting the
//! route. This is a sampling reducer, not Douglas-Peucker: points are kept
//! at a uniform stride, plus wherever the track turns.

use log::info;

use crate::RoutePoint;

/// Turn angle above which an interior point is always retained, radians.
const TURN_ANGLE_THRESHOLD: f64 = 15.0 * std::f64::consts::PI / 180.0;

/// Reduce `points` to at most `max_points`, preserving the first and last
/// point and biasing directional outliers toward retention.
///
/// Polylines already within budget are returned unchanged. The first pass
/// keeps points at a sampling stride of `len / max_points` plus any interior
/// point whose turn angle exceeds 15°; if that still exceeds the budget, a
/// uniform-stride thinning pass runs over the reduced set.
pub fn simplify_route(points: &[RoutePoint], max_points: usize) -> Vec<RoutePoint> {
    if max_points < 2 || points.len() <= max_points {
        return points.to_vec();
    }

    let stride = points.len() as f64 / max_points as f64;
    let mut reduced = Vec::with_capacity(max_points + max_points / 4);
    reduced.push(points[0]);

    let mut last_kept = 0usize;
    for i in 1..points.len() - 1 {
        if (i - last_kept) as f64 >= stride {
            reduced.push(points[i]);
            last_kept = i;
        } else if i > 1 {
            if let Some(angle) = turn_angle(&points[i - 1], &points[i], &points[i + 1]) {
                if angle > TURN_ANGLE_THRESHOLD {
                    reduced.push(points[i]);
                    last_kept = i;
                }
            }
        }
    }
    reduced.push(points[points.len() - 1]);

    if reduced.len() > max_points {
        reduced = thin_uniform(&reduced, max_points);
    }

    info!(
        "route simplification: {} points -> {} (target {})",
        points.len(),
        reduced.len(),
        max_points
    );
    reduced
}

/// Uniform-stride thinning to exactly `max_points`, preserving endpoints.
fn thin_uniform(points: &[RoutePoint], max_points: usize) -> Vec<RoutePoint> {
    let step = points.len() as f64 / max_points as f64;
    let mut thinned: Vec<RoutePoint> = (0..max_points)
        .map(|i| points[(i as f64 * step) as usize])
        .collect();
    // Stride sampling lands short of the end; pin the true last point.
    thinned[max_points - 1] = points[points.len() - 1];
    thinned
}

/// Angle between the incoming and outgoing direction vectors at `curr`,
/// using planar lat/lon deltas. `None` when either vector is zero-length.
fn turn_angle(prev: &RoutePoint, curr: &RoutePoint, next: &RoutePoint) -> Option<f64> {
    let v1_lon = curr.longitude - prev.longitude;
    let v1_lat = curr.latitude - prev.latitude;
    let v2_lon = next.longitude - curr.longitude;
    let v2_lat = next.latitude - curr.latitude;

    let mag1 = (v1_lon * v1_lon + v1_lat * v1_lat).sqrt();
    let mag2 = (v2_lon * v2_lon + v2_lat * v2_lat).sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return None;
    }

    let cos_angle = ((v1_lon * v2_lon + v1_lat * v2_lat) / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_line(count: usize) -> Vec<RoutePoint> {
        (0..count)
            .map(|i| RoutePoint::new(i as f64 * 0.001, 45.0))
            .collect()
    }

    #[test]
    fn test_identity_under_budget() {
        let points = straight_line(100);
        let simplified = simplify_route(&points, 300);
        assert_eq!(simplified, points);
    }

    #[test]
    fn test_budget_respected() {
        let points = straight_line(2000);
        let simplified = simplify_route(&points, 300);
        assert!(simplified.len() <= 300, "got {} points", simplified.len());
        assert!(simplified.len() >= 2);
    }

    #[test]
    fn test_endpoints_preserved() {
        let points = straight_line(1500);
        let simplified = simplify_route(&points, 100);
        assert_eq!(simplified[0], points[0]);
        assert_eq!(simplified[simplified.len() - 1], points[points.len() - 1]);
    }

    #[test]
    fn test_sharp_turn_retained() {
        // Straight east, then a right-angle turn north at the midpoint.
        let mut points = Vec::new();
        for i in 0..250 {
            points.push(RoutePoint::new(i as f64 * 0.001, 45.0));
        }
        let corner = RoutePoint::new(0.249, 45.0);
        for i in 1..250 {
            points.push(RoutePoint::new(0.249, 45.0 + i as f64 * 0.001));
        }
        let simplified = simplify_route(&points, 300);
        assert!(
            simplified.contains(&corner),
            "corner point dropped from simplified route"
        );
    }

    #[test]
    fn test_duplicate_points_do_not_panic() {
        // Zero-length direction vectors skip the angle test.
        let mut points = straight_line(600);
        points[300] = points[299];
        points[301] = points[299];
        let simplified = simplify_route(&points, 200);
        assert!(simplified.len() <= 200);
    }

    #[test]
    fn test_two_point_budget() {
        let points = straight_line(50);
        let simplified = simplify_route(&points, 2);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified[0], points[0]);
        assert_eq!(simplified[1], points[49]);
    }
}
