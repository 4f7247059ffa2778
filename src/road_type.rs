//! Road-class classification and overlay.
//!
//! Routing services describe the road class of index ranges along the route
//! geometry (e.g. `[12, 40, "motorway"]`). This module maps those tags to an
//! effective legal speed limit and stamps the limit onto each decoded point.

use crate::{GpsPoint, RoutePoint};

/// Speed limit for untagged or unknown roads (km/h).
pub const DEFAULT_SPEED_LIMIT_KMH: f64 = 50.0;

/// How a road class resolves to a limit.
#[derive(Debug, Clone, Copy)]
enum Limit {
    /// Fixed legal limit, capped by the user's maximum.
    Capped(u32),
    /// Fixed legal limit regardless of the user's maximum.
    Fixed(u32),
}

/// Ordered by priority: the first tag contained in the road class wins, so
/// compound classes like `motorway_link` resolve to their parent class.
const ROAD_CLASS_LIMITS: &[(&str, Limit)] = &[
    ("motorway", Limit::Capped(130)),
    ("trunk", Limit::Capped(110)),
    ("primary", Limit::Capped(90)),
    ("secondary", Limit::Capped(90)),
    ("tertiary", Limit::Capped(90)),
    ("unclassified", Limit::Fixed(50)),
    ("residential", Limit::Fixed(50)),
    ("service", Limit::Fixed(30)),
];

/// A road class tag covering the inclusive point index range
/// `start_index..=end_index`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadClassRange {
    pub start_index: u32,
    pub end_index: u32,
    pub road_class: String,
}

impl RoadClassRange {
    pub fn new(start_index: u32, end_index: u32, road_class: impl Into<String>) -> Self {
        Self {
            start_index,
            end_index,
            road_class: road_class.into(),
        }
    }
}

/// Map a road class tag to a speed limit in km/h.
///
/// Matching is case-insensitive substring containment against an ordered
/// table. Missing or unknown tags default to 50 km/h.
///
/// ```rust
/// use eco_route::road_type::classify_road_type;
///
/// assert_eq!(classify_road_type(Some("Motorway"), 130), 130.0);
/// assert_eq!(classify_road_type(Some("motorway_link"), 110), 110.0);
/// assert_eq!(classify_road_type(Some("residential"), 30), 50.0);
/// assert_eq!(classify_road_type(None, 130), 50.0);
/// ```
pub fn classify_road_type(tag: Option<&str>, user_max_speed_kmh: u32) -> f64 {
    let Some(tag) = tag else {
        return DEFAULT_SPEED_LIMIT_KMH;
    };
    let tag = tag.to_lowercase();

    ROAD_CLASS_LIMITS
        .iter()
        .find(|(key, _)| tag.contains(key))
        .map(|(_, limit)| match *limit {
            Limit::Capped(kmh) => f64::from(kmh.min(user_max_speed_kmh)),
            Limit::Fixed(kmh) => f64::from(kmh),
        })
        .unwrap_or(DEFAULT_SPEED_LIMIT_KMH)
}

/// Turn decoded coordinates plus road class ranges into route points.
///
/// Each point takes the limit of the first range that covers its index, so a
/// boundary index shared by two consecutive ranges keeps the earlier class.
/// Points covered by no range are treated as untagged. Missing elevation is
/// read as 0 m.
pub fn apply_road_classes(
    coords: &[GpsPoint],
    ranges: &[RoadClassRange],
    user_max_speed_kmh: u32,
) -> Vec<RoutePoint> {
    let mut limits: Vec<Option<f64>> = vec![None; coords.len()];

    for range in ranges {
        let start = range.start_index as usize;
        if start >= coords.len() {
            continue;
        }
        let end = (range.end_index as usize).min(coords.len() - 1);
        let limit = classify_road_type(Some(&range.road_class), user_max_speed_kmh);

        for slot in limits.iter_mut().take(end + 1).skip(start) {
            slot.get_or_insert(limit);
        }
    }

    coords
        .iter()
        .zip(limits)
        .map(|(c, limit)| RoutePoint {
            latitude: c.latitude,
            longitude: c.longitude,
            elevation: c.elevation.unwrap_or(0.0),
            speed_limit_kmh: limit.unwrap_or_else(|| classify_road_type(None, user_max_speed_kmh)),
        })
        .collect()
}
