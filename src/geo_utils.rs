//! # Geographic Utilities
//!
//! Distance and geometry helpers shared by the segmentation engine and the
//! trip planner.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two coordinates |
//! | [`compute_bounds`] | Bounding box of a track |
//! | [`simplify_for_display`] | Douglas-Peucker simplification of display geometry |
//!
//! ## Example
//!
//! ```rust
//! use eco_route::geo_utils;
//!
//! // Le Havre city center to the first motorway access
//! let d = geo_utils::haversine_distance(49.4944, 0.1079, 49.4850, 0.1300);
//! assert!((d - 1_908.0).abs() < 5.0);
//! ```
//!
//! ## Haversine Formula
//!
//! The haversine formula treats the Earth as a sphere of radius 6,371 km. Inputs
//! are WGS84 degrees and are not range-checked here: validating coordinates is
//! the caller's job.

use geo::{Coord, LineString, Simplify};

use crate::{Bounds, GpsPoint};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance in meters between two coordinates in degrees.
///
/// # Example
///
/// ```rust
/// use eco_route::geo_utils::haversine_distance;
///
/// assert_eq!(haversine_distance(51.5074, -0.1278, 51.5074, -0.1278), 0.0);
/// let london_paris = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
/// assert!((london_paris - 343_500.0).abs() < 1_000.0);
/// ```
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

// =============================================================================
// Geometry Functions
// =============================================================================

/// Bounding box of a track, or `None` for an empty track.
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(Bounds { min_lat, max_lat, min_lng, max_lng })
}

/// Reduce a track for map display with Douglas-Peucker.
///
/// `tolerance_deg` is in degrees (0.0001 is roughly 11 m). The first and last
/// points are always kept. Elevation is carried over for kept points.
pub fn simplify_for_display(points: &[GpsPoint], tolerance_deg: f64) -> Vec<GpsPoint> {
    if points.len() < 3 || tolerance_deg <= 0.0 {
        return points.to_vec();
    }

    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect();
    let simplified = line.simplify(&tolerance_deg);

    // Simplify keeps a subsequence, so walk both in order to recover elevation.
    let mut source = points.iter();
    simplified
        .0
        .iter()
        .map(|c| {
            source
                .by_ref()
                .find(|p| p.longitude == c.x && p.latitude == c.y)
                .copied()
                .unwrap_or_else(|| GpsPoint::new(c.y, c.x))
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
