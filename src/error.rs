//! Unified error handling for the fuel-router library.
//!
//! Planning either produces a [`crate::Plan`] or one of these typed
//! failures; the core never surfaces raw numeric errors (division by zero,
//! index panics) to callers.

use thiserror::Error;

/// Unified error type for planning operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The request failed validation before any computation ran.
    #[error("invalid plan request: {message}")]
    Validation { message: String },

    /// A gap between two consecutive necessary waypoints exceeds the
    /// vehicle's maximum range. No partial plan is produced.
    #[error(
        "route unreachable: {gap_km:.1} km to the next waypoint at \
         {position_km:.1} km along the route, but range is {range_km:.1} km"
    )]
    RouteUnreachable {
        /// Distance along the route where the vehicle is stranded, km.
        position_km: f64,
        /// Distance to the nearest waypoint that would have to be reached, km.
        gap_km: f64,
        /// Range available at that position, km.
        range_km: f64,
    },
}

impl PlanError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        PlanError::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, PlanError>;
