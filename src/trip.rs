//! Request-level trip planning.
//!
//! Validates a request, derives the driving conditions (mass with passengers,
//! auxiliary power with climate control, air density), runs the segmentation
//! engine and summarizes the result.

use log::{debug, info};

use crate::error::{EcoRouteError, Result};
use crate::geo_utils::{compute_bounds, simplify_for_display};
use crate::road_type::{apply_road_classes, RoadClassRange};
use crate::segments::{build_segments, Segment, SegmentContext};
use crate::{
    Bounds, DrivingConditions, EcoSpeedPolicy, EnergyConfig, GpsPoint, RoutePoint, VehicleProfile,
};

/// Auxiliary draw of climate control at full intensity (kW).
pub const CLIMATE_FULL_POWER_KW: f64 = 2.5;

/// CO₂ attributed to each kWh saved (kg).
pub const CO2_KG_PER_KWH: f64 = 0.5;

/// Request-level overrides for one trip.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripParameters {
    /// Highest speed the driver accepts on fast roads (km/h). Default: 130
    pub max_speed_kmh: u32,

    /// Passengers on top of the vehicle's extra load. Default: 0
    pub passengers: u32,

    /// Average passenger weight (kg). Default: 75
    pub passenger_weight_kg: f64,

    /// Whether climate control runs during the trip. Default: false
    pub climate_enabled: bool,

    /// Climate control intensity, 0.0 to 1.0. Default: 0.5
    pub climate_intensity: f64,

    /// Air density (kg/m³). Default: 1.225
    pub air_density: f64,

    /// Douglas-Peucker tolerance in degrees for the returned display geometry.
    /// `None` keeps every point. Default: None
    pub display_tolerance_deg: Option<f64>,

    pub energy: EnergyConfig,

    pub eco_policy: EcoSpeedPolicy,
}

impl Default for TripParameters {
    fn default() -> Self {
        let energy = EnergyConfig::default();
        Self {
            max_speed_kmh: 130,
            passengers: 0,
            passenger_weight_kg: 75.0,
            climate_enabled: false,
            climate_intensity: 0.5,
            air_density: energy.default_air_density,
            display_tolerance_deg: None,
            energy,
            eco_policy: EcoSpeedPolicy::default(),
        }
    }
}

impl TripParameters {
    /// Mass, auxiliary power and air density for this trip in `vehicle`.
    pub fn driving_conditions(&self, vehicle: &VehicleProfile) -> DrivingConditions {
        let total_mass = vehicle.loaded_mass_kg()
            + f64::from(self.passengers) * self.passenger_weight_kg.max(0.0);

        let climate_kw = if self.climate_enabled {
            self.climate_intensity.clamp(0.0, 1.0) * CLIMATE_FULL_POWER_KW
        } else {
            0.0
        };

        DrivingConditions {
            total_mass_kg: Some(total_mass),
            aux_power_kw: Some(vehicle.aux_power_kw + climate_kw),
            air_density: Some(self.air_density),
        }
    }
}

/// Trip totals comparing eco driving against the limit and the simulated driver.
///
/// Energies in kWh, times in minutes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteKpis {
    pub eco_energy: f64,
    pub real_energy: f64,
    pub limit_energy: f64,
    pub energy_saved: f64,
    pub energy_saved_percent: f64,
    pub energy_saved_vs_real: f64,
    pub energy_saved_vs_real_percent: f64,
    pub extra_time: f64,
    pub co2_avoided: f64,
    pub eco_score: u32,
    pub total_distance: f64,
    pub eco_time: f64,
    pub real_time: f64,
    pub limit_time: f64,
}

impl RouteKpis {
    pub fn from_segments(segments: &[Segment]) -> Self {
        if segments.is_empty() {
            return Self { eco_score: eco_score(0.0), ..Self::default() };
        }

        let eco_energy = sum_of(segments, |s| s.eco_energy);
        let real_energy = sum_of(segments, |s| s.real_energy);
        let limit_energy = sum_of(segments, |s| s.limit_energy);
        let eco_time = sum_of(segments, |s| s.eco_time) / 60.0;
        let real_time = sum_of(segments, |s| s.real_time) / 60.0;
        let limit_time = sum_of(segments, |s| s.limit_time) / 60.0;

        let energy_saved = limit_energy - eco_energy;
        let energy_saved_percent = percent_of(energy_saved, limit_energy);
        let energy_saved_vs_real = real_energy - eco_energy;

        Self {
            eco_energy,
            real_energy,
            limit_energy,
            energy_saved,
            energy_saved_percent,
            energy_saved_vs_real,
            energy_saved_vs_real_percent: percent_of(energy_saved_vs_real, real_energy),
            extra_time: eco_time - limit_time,
            co2_avoided: energy_saved * CO2_KG_PER_KWH,
            eco_score: eco_score(energy_saved_percent),
            total_distance: sum_of(segments, |s| s.distance) / 1000.0,
            eco_time,
            real_time,
            limit_time,
        }
    }
}

fn sum_of(segments: &[Segment], field: impl Fn(&Segment) -> f64) -> f64 {
    segments.iter().map(field).sum()
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// 50 for no savings, one point per percent saved, capped at 100.
fn eco_score(energy_saved_percent: f64) -> u32 {
    (50.0 + energy_saved_percent.clamp(0.0, 50.0)).round() as u32
}

/// A computed trip, ready for display.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    pub segments: Vec<Segment>,
    /// Kilometers, rounded to 2 decimals
    pub total_distance_km: f64,
    pub coordinates: Vec<GpsPoint>,
    pub bounds: Option<Bounds>,
    pub kpis: RouteKpis,
}

/// Plan a trip over already classified route points.
///
/// # Errors
///
/// [`EcoRouteError::InsufficientPoints`] for fewer than two points and
/// [`EcoRouteError::InvalidVehicle`] for an unusable profile.
///
/// # Example
///
/// ```rust
/// use eco_route::{plan_trip, presets, TripParameters};
///
/// let vehicle = &presets::default_vehicle_profiles()[0];
/// let result = plan_trip(&presets::demo_route(), vehicle, &TripParameters::default()).unwrap();
/// assert!(!result.segments.is_empty());
/// assert!(result.kpis.energy_saved > 0.0);
/// ```
pub fn plan_trip(
    points: &[RoutePoint],
    vehicle: &VehicleProfile,
    params: &TripParameters,
) -> Result<RouteResult> {
    if points.len() < 2 {
        return Err(EcoRouteError::insufficient_points(points.len()));
    }
    vehicle.validate()?;

    let start = std::time::Instant::now();
    let conditions = params.driving_conditions(vehicle);
    let ctx = SegmentContext {
        vehicle,
        conditions: &conditions,
        energy: &params.energy,
        policy: &params.eco_policy,
    };

    let segments = build_segments(points, ctx);
    let total_distance_m: f64 = segments.iter().map(|s| s.distance).sum();
    let kpis = RouteKpis::from_segments(&segments);

    let coordinates: Vec<GpsPoint> = points
        .iter()
        .map(|p| GpsPoint::with_elevation(p.latitude, p.longitude, p.elevation))
        .collect();
    let coordinates = match params.display_tolerance_deg {
        Some(tolerance) => simplify_for_display(&coordinates, tolerance),
        None => coordinates,
    };
    let bounds = compute_bounds(&coordinates);

    debug!(
        "[EcoRoute] Planning {} points for {}: mass {:.0} kg, aux {:.2} kW",
        points.len(),
        vehicle.name,
        conditions.total_mass_kg(vehicle),
        conditions.aux_power_kw(vehicle)
    );
    info!(
        "[EcoRoute] {} points -> {} segments, {:.1} km, eco {:.2} kWh vs limit {:.2} kWh in {:?}",
        points.len(),
        segments.len(),
        total_distance_m / 1000.0,
        kpis.eco_energy,
        kpis.limit_energy,
        start.elapsed()
    );

    Ok(RouteResult {
        segments,
        total_distance_km: (total_distance_m / 1000.0 * 100.0).round() / 100.0,
        coordinates,
        bounds,
        kpis,
    })
}

/// Classify decoded coordinates with road class ranges, then plan the trip.
///
/// The user's maximum speed comes from `params.max_speed_kmh`.
pub fn plan_route_from_coordinates(
    coords: &[GpsPoint],
    ranges: &[RoadClassRange],
    vehicle: &VehicleProfile,
    params: &TripParameters,
) -> Result<RouteResult> {
    let points = apply_road_classes(coords, ranges, params.max_speed_kmh);
    plan_trip(&points, vehicle, params)
}

/// Plan the same route for several vehicles, one result per vehicle in order.
pub fn plan_trips(
    points: &[RoutePoint],
    vehicles: &[VehicleProfile],
    params: &TripParameters,
) -> Vec<Result<RouteResult>> {
    vehicles.iter().map(|v| plan_trip(points, v, params)).collect()
}

/// Parallel version of [`plan_trips`].
///
/// Each computation owns its data, so vehicles are evaluated independently
/// across the rayon pool.
#[cfg(feature = "parallel")]
pub fn plan_trips_parallel(
    points: &[RoutePoint],
    vehicles: &[VehicleProfile],
    params: &TripParameters,
) -> Vec<Result<RouteResult>> {
    use rayon::prelude::*;

    info!("[EcoRoute] Planning {} vehicles in parallel", vehicles.len());
    vehicles.par_iter().map(|v| plan_trip(points, v, params)).collect()
}
