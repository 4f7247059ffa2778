//! Error types for trip planning and the routing collaborator.
//!
//! The physics core never fails: degenerate inputs (zero speed, zero distance,
//! near-zero efficiency, extreme slopes) are clamped locally. Errors only
//! surface at the request boundary, for caller input and for the external
//! geocoding/routing services.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EcoRouteError>;

/// Everything that can go wrong before or around a route computation.
#[derive(Debug, Error)]
pub enum EcoRouteError {
    /// A route needs at least one pair of points.
    #[error("route has {point_count} points, at least {minimum_required} are required")]
    InsufficientPoints {
        point_count: usize,
        minimum_required: usize,
    },

    /// The vehicle profile has a physically meaningless parameter.
    #[error("invalid vehicle profile '{name}': {reason}")]
    InvalidVehicle { name: String, reason: String },

    /// The geocoding service returned no match for an address.
    #[error("could not resolve address '{0}'")]
    AddressNotFound(String),

    /// The routing service answered, but not with a usable route.
    #[error("routing service error: {0}")]
    Routing(String),

    /// Transport-level failure talking to the routing service.
    #[cfg(feature = "http")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl EcoRouteError {
    /// Shorthand for the "fewer than two points" input error.
    pub fn insufficient_points(point_count: usize) -> Self {
        Self::InsufficientPoints {
            point_count,
            minimum_required: 2,
        }
    }
}
