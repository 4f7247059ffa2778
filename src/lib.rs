//! # Eco Route
//!
//! Physics-based energy estimation and eco-speed segmentation for electric
//! vehicle trips.
//!
//! This library provides:
//! - Polyline5 decoding (with optional elevation) and great-circle distances
//! - Road-class to speed-limit mapping
//! - A force-balance energy model (gravity, rolling resistance, drag, regen)
//! - An eco-speed heuristic and a reproducible "real driver" simulation
//! - Segmentation of a route into runs of equal speed limit with per-segment
//!   energy and time for the three speed strategies
//!
//! ## Features
//!
//! - **`parallel`** - Compare several vehicles on one route with rayon
//! - **`http`** - Geocoding and routing client for a GraphHopper-compatible API
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use eco_route::{plan_trip, RoutePoint, TripParameters, VehicleProfile};
//!
//! let points = vec![
//!     RoutePoint::new(49.4944, 0.1079, 5.0, 50.0),
//!     RoutePoint::new(49.4850, 0.1300, 8.0, 50.0),
//!     RoutePoint::new(49.4700, 0.1600, 12.0, 90.0),
//! ];
//!
//! let result = plan_trip(&points, &VehicleProfile::default(), &TripParameters::default()).unwrap();
//! for segment in &result.segments {
//!     println!(
//!         "{:.0} m at {} km/h (eco {} km/h): {:.3} kWh",
//!         segment.distance, segment.speed_limit, segment.eco_speed, segment.eco_energy
//!     );
//! }
//! println!("Saved {:.2} kWh, score {}", result.kpis.energy_saved, result.kpis.eco_score);
//! ```

pub mod error;
pub use error::{EcoRouteError, Result};

pub mod polyline;
pub use polyline::{decode_polyline5, encode_polyline5, Polyline5Decoder};

pub mod geo_utils;
pub use geo_utils::{compute_bounds, haversine_distance};

pub mod road_type;
pub use road_type::{apply_road_classes, classify_road_type, RoadClassRange};

pub mod energy;
pub use energy::{segment_energy, DrivingConditions, EnergyConfig};

pub mod eco_speed;
pub use eco_speed::{eco_speed, EcoSpeedPolicy, Terrain};

pub mod real_speed;
pub use real_speed::simulate_real_speed;

// Per-pair records and the same-limit merge
pub mod segments;
pub use segments::{build_segments, merge_segments, Segment, SegmentContext, SegmentMerger};

pub mod trip;
pub use trip::{plan_route_from_coordinates, plan_trip, plan_trips, RouteKpis, RouteResult, TripParameters};

#[cfg(feature = "parallel")]
pub use trip::plan_trips_parallel;

pub mod presets;

// Geocoding and routing client
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{FetchedRoute, RouteFetcher};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("EcoRouteRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate, optionally with elevation in meters.
///
/// # Example
/// ```
/// use eco_route::GpsPoint;
/// let point = GpsPoint::new(49.4944, 0.1079); // Le Havre
/// assert!(point.elevation.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

impl GpsPoint {
    /// Create a new GPS point without elevation.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, elevation: None }
    }

    pub fn with_elevation(latitude: f64, longitude: f64, elevation: impl Into<Option<f64>>) -> Self {
        Self { latitude, longitude, elevation: elevation.into() }
    }
}

/// Bounding box for a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// A route vertex with the elevation and speed limit the engine works on.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters
    pub elevation: f64,
    /// km/h
    pub speed_limit_kmh: f64,
}

impl RoutePoint {
    pub fn new(latitude: f64, longitude: f64, elevation: f64, speed_limit_kmh: f64) -> Self {
        Self { latitude, longitude, elevation, speed_limit_kmh }
    }
}

/// Physical parameters of an electric vehicle.
///
/// `drag_area_m2` is the product of drag coefficient and frontal area (CdA).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleProfile {
    pub name: String,

    /// Curb mass (kg). Default: 1600
    pub empty_mass_kg: f64,

    /// Static extra load such as luggage or the driver (kg). Default: 150
    pub extra_load_kg: f64,

    /// Drag coefficient × frontal area (m²). Default: 0.616 (0.28 × 2.2)
    pub drag_area_m2: f64,

    /// Rolling resistance coefficient. Default: 0.008
    pub rolling_resistance: f64,

    /// Battery-to-wheel efficiency, 0 to 1. Default: 0.88
    pub motor_efficiency: f64,

    /// Wheel-to-battery efficiency when regenerating, 0 to 1. Default: 0.68
    pub regen_efficiency: f64,

    /// Constant draw of electronics and comfort systems (kW). Default: 1.0
    pub aux_power_kw: f64,

    /// Default: 60
    pub battery_capacity_kwh: f64,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            name: "Custom".to_string(),
            empty_mass_kg: 1600.0,
            extra_load_kg: 150.0,
            drag_area_m2: 0.28 * 2.2,
            rolling_resistance: 0.008,
            motor_efficiency: 0.88,
            regen_efficiency: 0.68,
            aux_power_kw: 1.0,
            battery_capacity_kwh: 60.0,
        }
    }
}

impl VehicleProfile {
    /// Empty mass plus extra load.
    pub fn loaded_mass_kg(&self) -> f64 {
        self.empty_mass_kg + self.extra_load_kg
    }

    /// Reject parameters that make no physical sense.
    ///
    /// The energy model itself tolerates all of them; this check is for
    /// profiles coming from users.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Result<()> {
            Err(EcoRouteError::InvalidVehicle { name: self.name.clone(), reason })
        };

        if !(self.empty_mass_kg.is_finite() && self.empty_mass_kg > 0.0) {
            return invalid(format!("empty mass must be positive, got {}", self.empty_mass_kg));
        }

        let non_negative = [
            ("extra load", self.extra_load_kg),
            ("drag area", self.drag_area_m2),
            ("rolling resistance", self.rolling_resistance),
            ("auxiliary power", self.aux_power_kw),
            ("battery capacity", self.battery_capacity_kwh),
        ];
        for (label, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{} must be non-negative, got {}", label, value));
            }
        }

        for (label, value) in [("motor efficiency", self.motor_efficiency), ("regen efficiency", self.regen_efficiency)] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} must be within [0, 1], got {}", label, value));
            }
        }

        Ok(())
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{info, warn};

    fn log_failure(result: Result<RouteResult>) -> Option<RouteResult> {
        result.map_err(|e| warn!("[EcoRouteRust] Route computation failed: {}", e)).ok()
    }

    /// Compute eco-speed segments and KPIs for classified route points.
    #[uniffi::export]
    pub fn ffi_plan_trip(
        points: Vec<RoutePoint>,
        vehicle: VehicleProfile,
        params: TripParameters,
    ) -> Option<RouteResult> {
        init_logging();
        info!("[EcoRouteRust] plan_trip called for {} with {} points", vehicle.name, points.len());
        log_failure(plan_trip(&points, &vehicle, &params))
    }

    /// Same as [`ffi_plan_trip`], for decoded coordinates plus road class ranges.
    #[uniffi::export]
    pub fn ffi_plan_route_from_coordinates(
        coordinates: Vec<GpsPoint>,
        road_classes: Vec<RoadClassRange>,
        vehicle: VehicleProfile,
        params: TripParameters,
    ) -> Option<RouteResult> {
        init_logging();
        info!(
            "[EcoRouteRust] plan_route_from_coordinates: {} points, {} road class ranges",
            coordinates.len(),
            road_classes.len()
        );
        log_failure(plan_route_from_coordinates(&coordinates, &road_classes, &vehicle, &params))
    }

    /// Evaluate one route for several vehicles. `None` where a vehicle failed.
    #[uniffi::export]
    pub fn ffi_compare_vehicles(
        points: Vec<RoutePoint>,
        vehicles: Vec<VehicleProfile>,
        params: TripParameters,
    ) -> Vec<Option<RouteResult>> {
        init_logging();
        let start = std::time::Instant::now();

        let results: Vec<Option<RouteResult>> = plan_trips_parallel(&points, &vehicles, &params)
            .into_iter()
            .map(log_failure)
            .collect();

        info!("[EcoRouteRust] Compared {} vehicles in {:?}", vehicles.len(), start.elapsed());
        results
    }

    /// Decode a Polyline5 string, with a third elevation value per point when
    /// `has_elevation` is set.
    #[uniffi::export]
    pub fn ffi_decode_polyline(encoded: String, has_elevation: bool) -> Vec<GpsPoint> {
        decode_polyline5(&encoded, has_elevation)
    }

    /// Built-in vehicle presets.
    #[uniffi::export]
    pub fn default_vehicle_profiles() -> Vec<VehicleProfile> {
        init_logging();
        crate::presets::default_vehicle_profiles()
    }

    /// Le Havre to Versailles sample route for offline use.
    #[uniffi::export]
    pub fn demo_route() -> Vec<RoutePoint> {
        crate::presets::demo_route()
    }

    /// Get default trip parameters.
    #[uniffi::export]
    pub fn default_trip_parameters() -> TripParameters {
        TripParameters::default()
    }

    /// Geocode both addresses, fetch the route and plan it.
    #[cfg(feature = "http")]
    #[uniffi::export]
    pub fn fetch_and_plan_route(
        api_key: String,
        start_address: String,
        end_address: String,
        vehicle: VehicleProfile,
        params: TripParameters,
    ) -> Option<RouteResult> {
        init_logging();
        info!("[EcoRouteRust] fetch_and_plan_route: '{}' -> '{}'", start_address, end_address);
        log_failure(crate::http::fetch_and_plan_sync(
            &api_key,
            &start_address,
            &end_address,
            &vehicle,
            &params,
        ))
    }
}
