//! Eco-speed recommendation.
//!
//! A scoring heuristic, not a search over the energy model: the segment is
//! classified as uphill, downhill or flat, a base fraction of the legal limit
//! is picked, and the fraction is nudged by how the vehicle compares to a
//! reference car (mass, rolling/aero resistance, drivetrain efficiency).
//!
//! Every nudge has the form `min(cap, (ratio - 1) * cap)`: linear in the
//! excess over the reference and capped. A ratio below 1 gives a negative
//! nudge, so a lighter or more efficient vehicle gets a slightly higher
//! recommendation.
//!
//! The result always lies in `[min_speed_kmh, speed_limit_kmh]`; when the
//! limit itself is below the minimum, the limit wins.

use crate::VehicleProfile;

/// Tuning constants of the eco-speed heuristic.
///
/// These are policy, not derived physics. The slope thresholds are
/// independent of [`EnergyConfig::max_slope`](crate::EnergyConfig::max_slope).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EcoSpeedPolicy {
    /// Lowest speed ever recommended (km/h). Default: 30
    pub min_speed_kmh: f64,

    /// Slope above which a segment counts as uphill. Default: 0.02
    pub uphill_slope: f64,
    /// Slope below which a segment counts as downhill. Default: -0.02
    pub downhill_slope: f64,

    /// Reference rolling resistance coefficient. Default: 0.008
    pub reference_rolling_resistance: f64,
    /// Reference drag area Cd·A (m²). Default: 0.6
    pub reference_drag_area_m2: f64,
    /// Reference mean drivetrain efficiency. Default: 0.90
    pub reference_efficiency: f64,
    /// Reference regenerative efficiency for the downhill bonus. Default: 0.85
    pub reference_regen_efficiency: f64,
    /// Weight of rolling resistance in the resistance factor. Default: 0.4
    pub rolling_weight: f64,
    /// Weight of aerodynamic drag in the resistance factor. Default: 0.6
    pub drag_weight: f64,
    /// How strongly efficiency deviations feed the efficiency adjustment. Default: 0.1
    pub efficiency_sensitivity: f64,

    /// Uphill base fraction of the limit. Default: 0.65
    pub uphill_base: f64,
    pub uphill_mass_cap: f64,
    pub uphill_resistance_cap: f64,
    pub uphill_efficiency_cap: f64,

    /// Downhill base fraction of the limit. Default: 0.85
    pub downhill_base: f64,
    pub downhill_mass_cap: f64,
    pub downhill_regen_cap: f64,
    pub downhill_resistance_cap: f64,

    /// Flat base fraction of the limit. Default: 0.88
    pub flat_base: f64,
    pub flat_mass_cap: f64,
    pub flat_resistance_cap: f64,
    pub flat_efficiency_cap: f64,
}

impl Default for EcoSpeedPolicy {
    fn default() -> Self {
        Self {
            min_speed_kmh: 30.0,
            uphill_slope: 0.02,
            downhill_slope: -0.02,
            reference_rolling_resistance: 0.008,
            reference_drag_area_m2: 0.6,
            reference_efficiency: 0.90,
            reference_regen_efficiency: 0.85,
            rolling_weight: 0.4,
            drag_weight: 0.6,
            efficiency_sensitivity: 0.1,
            uphill_base: 0.65,
            uphill_mass_cap: 0.10,
            uphill_resistance_cap: 0.08,
            uphill_efficiency_cap: 0.05,
            downhill_base: 0.85,
            downhill_mass_cap: 0.05,
            downhill_regen_cap: 0.03,
            downhill_resistance_cap: 0.02,
            flat_base: 0.88,
            flat_mass_cap: 0.03,
            flat_resistance_cap: 0.05,
            flat_efficiency_cap: 0.03,
        }
    }
}

/// Terrain class of a segment for the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Uphill,
    Downhill,
    Flat,
}

impl Terrain {
    pub fn classify(distance_m: f64, elevation_change_m: f64, policy: &EcoSpeedPolicy) -> Self {
        let slope = if distance_m > 0.0 { elevation_change_m / distance_m } else { 0.0 };
        if slope > policy.uphill_slope {
            Terrain::Uphill
        } else if slope < policy.downhill_slope {
            Terrain::Downhill
        } else {
            Terrain::Flat
        }
    }
}

/// Vehicle ratios against the policy's reference car.
#[derive(Debug, Clone, Copy)]
struct VehicleFactors {
    mass: f64,
    resistance: f64,
    /// Above 1 when the drivetrain is less efficient than the reference.
    efficiency_penalty: f64,
    regen: f64,
}

impl VehicleFactors {
    fn new(vehicle: &VehicleProfile, total_mass_kg: f64, policy: &EcoSpeedPolicy) -> Self {
        let mass = if vehicle.empty_mass_kg > 0.0 {
            total_mass_kg / vehicle.empty_mass_kg
        } else {
            1.0
        };

        let resistance = policy.rolling_weight
            * (vehicle.rolling_resistance / policy.reference_rolling_resistance)
            + policy.drag_weight * (vehicle.drag_area_m2 / policy.reference_drag_area_m2);

        let efficiency = (vehicle.motor_efficiency + vehicle.regen_efficiency) / 2.0
            / policy.reference_efficiency;
        let adjustment = 1.0 - (1.0 - efficiency) * policy.efficiency_sensitivity;
        // Adjustment stays near 1 for any sane efficiency; guard the division anyway.
        let efficiency_penalty = 1.0 / adjustment.max(f64::EPSILON);

        let regen = vehicle.regen_efficiency / policy.reference_regen_efficiency;

        Self { mass, resistance, efficiency_penalty, regen }
    }
}

/// `min(cap, (ratio - 1) * cap)`.
#[inline]
fn capped(cap: f64, ratio: f64) -> f64 {
    cap.min((ratio - 1.0) * cap)
}

/// Recommended eco speed (km/h) for one segment, rounded to 0.1 km/h.
///
/// `total_mass_kg` defaults to the vehicle's loaded mass.
///
/// # Example
///
/// ```rust
/// use eco_route::{VehicleProfile, EcoSpeedPolicy, eco_speed::eco_speed};
///
/// let vehicle = VehicleProfile::default();
/// let policy = EcoSpeedPolicy::default();
///
/// let climb = eco_speed(1000.0, 50.0, 130.0, &vehicle, None, &policy);
/// let flat = eco_speed(1000.0, 0.0, 130.0, &vehicle, None, &policy);
/// assert!(climb < flat);
/// assert!(flat <= 130.0);
/// ```
pub fn eco_speed(
    distance_m: f64,
    elevation_change_m: f64,
    speed_limit_kmh: f64,
    vehicle: &VehicleProfile,
    total_mass_kg: Option<f64>,
    policy: &EcoSpeedPolicy,
) -> f64 {
    let total_mass = total_mass_kg.unwrap_or_else(|| vehicle.loaded_mass_kg());
    let f = VehicleFactors::new(vehicle, total_mass, policy);
    let min_speed = policy.min_speed_kmh;

    let speed = match Terrain::classify(distance_m, elevation_change_m, policy) {
        Terrain::Uphill => {
            let factor = policy.uphill_base
                - capped(policy.uphill_mass_cap, f.mass)
                - capped(policy.uphill_resistance_cap, f.resistance)
                - capped(policy.uphill_efficiency_cap, f.efficiency_penalty);
            min_speed.max(speed_limit_kmh * factor)
        }
        Terrain::Downhill => {
            let factor = policy.downhill_base
                + capped(policy.downhill_mass_cap, f.mass)
                + capped(policy.downhill_regen_cap, f.regen)
                - capped(policy.downhill_resistance_cap, f.resistance);
            (speed_limit_kmh * factor).min(speed_limit_kmh)
        }
        Terrain::Flat => {
            let factor = policy.flat_base
                - capped(policy.flat_mass_cap, f.mass)
                - capped(policy.flat_resistance_cap, f.resistance)
                - capped(policy.flat_efficiency_cap, f.efficiency_penalty);
            speed_limit_kmh * factor
        }
    };

    let clamped = speed.max(min_speed).min(speed_limit_kmh);
    round_tenth(clamped).min(speed_limit_kmh)
}

#[inline]
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
