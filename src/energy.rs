//! # Segment Energy Model
//!
//! Force-balance model of an EV travelling one segment at constant speed.
//!
//! ## Algorithm
//! 1. Resistive forces at the wheel: gravity along the slope, rolling
//!    resistance, aerodynamic drag
//! 2. Wheel power = total force × speed
//! 3. Electrical power: divide by motor efficiency when consuming, multiply by
//!    regenerative efficiency when recovering
//! 4. Add constant auxiliary load (climate control, electronics)
//! 5. Integrate over the traversal time and convert to kWh
//!
//! Both conversions lose energy, so a round trip with zero net elevation change
//! still costs energy. The model is total: zero speed, zero distance, a zero
//! motor efficiency or an implausible slope never produce an error or a NaN.

use crate::VehicleProfile;

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Sea-level air density at 15 °C (kg/m³).
pub const DEFAULT_AIR_DENSITY: f64 = 1.225;

/// Physical constants and numeric guards of the energy model.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyConfig {
    /// Gravitational acceleration (m/s²). Default: 9.81
    pub gravity: f64,

    /// Air density used when the caller gives none (kg/m³). Default: 1.225
    pub default_air_density: f64,

    /// Absolute slope above which elevation deltas are treated as noise and
    /// clamped. Default: 0.5 (50% grade)
    pub max_slope: f64,

    /// Lower bound applied to the motor efficiency before dividing by it.
    /// Default: 0.01
    pub min_efficiency: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            default_air_density: DEFAULT_AIR_DENSITY,
            max_slope: 0.5,
            min_efficiency: 0.01,
        }
    }
}

/// Per-trip overrides of the vehicle's nominal state.
///
/// Unset fields fall back to the vehicle profile (loaded mass, auxiliary power)
/// or to [`EnergyConfig::default_air_density`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrivingConditions {
    pub total_mass_kg: Option<f64>,
    pub aux_power_kw: Option<f64>,
    pub air_density: Option<f64>,
}

impl DrivingConditions {
    pub fn total_mass_kg(&self, vehicle: &VehicleProfile) -> f64 {
        self.total_mass_kg.unwrap_or_else(|| vehicle.loaded_mass_kg())
    }

    pub fn aux_power_kw(&self, vehicle: &VehicleProfile) -> f64 {
        self.aux_power_kw.unwrap_or(vehicle.aux_power_kw)
    }

    pub fn air_density(&self, config: &EnergyConfig) -> f64 {
        self.air_density.unwrap_or(config.default_air_density)
    }
}

/// Energy in kWh to drive `distance_m` at a constant `speed_kmh` while
/// climbing `elevation_change_m`.
///
/// Positive values are consumption; a negative value means the segment
/// recovered more through regeneration than the auxiliary load used.
/// A speed of zero or below returns exactly 0.0.
///
/// # Example
///
/// ```rust
/// use eco_route::{VehicleProfile, DrivingConditions, EnergyConfig, energy::segment_energy};
///
/// let vehicle = VehicleProfile::default();
/// let kwh = segment_energy(90.0, 10_000.0, 0.0, &vehicle, &DrivingConditions::default(), &EnergyConfig::default());
/// assert!(kwh > 0.0);
/// ```
pub fn segment_energy(
    speed_kmh: f64,
    distance_m: f64,
    elevation_change_m: f64,
    vehicle: &VehicleProfile,
    conditions: &DrivingConditions,
    config: &EnergyConfig,
) -> f64 {
    if speed_kmh <= 0.0 {
        return 0.0;
    }

    let speed_ms = speed_kmh / 3.6;
    let time_s = distance_m / speed_ms;

    let mass = conditions.total_mass_kg(vehicle);
    let air_density = conditions.air_density(config);
    let g = config.gravity;

    let slope = if distance_m > 0.0 {
        (elevation_change_m / distance_m).clamp(-config.max_slope, config.max_slope)
    } else {
        0.0
    };

    let f_gravity = mass * g * slope;
    let f_rolling = vehicle.rolling_resistance * mass * g * slope.atan().cos();
    let f_aero = 0.5 * air_density * vehicle.drag_area_m2 * speed_ms.powi(2);

    let wheel_power_w = (f_gravity + f_rolling + f_aero) * speed_ms;

    let electrical_power_w = if wheel_power_w >= 0.0 {
        wheel_power_w / vehicle.motor_efficiency.max(config.min_efficiency)
    } else {
        wheel_power_w * vehicle.regen_efficiency
    };

    let total_power_w = electrical_power_w + conditions.aux_power_kw(vehicle) * 1000.0;

    total_power_w * time_s / 3600.0 / 1000.0
}

/// Seconds needed to cover `distance_m` at `speed_kmh`, 0.0 for a
/// non-positive speed.
#[inline]
pub fn travel_time_s(distance_m: f64, speed_kmh: f64) -> f64 {
    if speed_kmh > 0.0 {
        distance_m / (speed_kmh / 3.6)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_vehicle() -> VehicleProfile {
        VehicleProfile {
            name: "Scenario".to_string(),
            empty_mass_kg: 1850.0,
            extra_load_kg: 150.0,
            drag_area_m2: 0.58,
            rolling_resistance: 0.008,
            motor_efficiency: 0.95,
            regen_efficiency: 0.85,
            aux_power_kw: 2.0,
            battery_capacity_kwh: 75.0,
        }
    }

    fn energy(speed: f64, distance: f64, elevation: f64, vehicle: &VehicleProfile) -> f64 {
        segment_energy(
            speed,
            distance,
            elevation,
            vehicle,
            &DrivingConditions::default(),
            &EnergyConfig::default(),
        )
    }

    #[test]
    fn test_zero_or_negative_speed_is_zero() {
        let v = scenario_vehicle();
        assert_eq!(energy(0.0, 5000.0, 100.0, &v), 0.0);
        assert_eq!(energy(-20.0, 5000.0, -100.0, &v), 0.0);
        assert_eq!(energy(-1.0, 0.0, 0.0, &v), 0.0);
    }

    #[test]
    fn test_motorway_scenario() {
        let v = scenario_vehicle();
        let kwh = energy(130.0, 5000.0, 0.0, &v);
        assert!(kwh > 0.0 && kwh < 2.0, "got {}", kwh);
        // Hand-computed: ~620 N at 36.1 m/s, /0.95, +2 kW, over 138.5 s
        assert!((kwh - 0.985).abs() < 0.01, "got {}", kwh);
    }

    #[test]
    fn test_flat_without_aux_is_positive() {
        let mut v = scenario_vehicle();
        v.aux_power_kw = 0.0;
        assert!(energy(50.0, 1000.0, 0.0, &v) > 0.0);
    }

    #[test]
    fn test_monotonic_in_aux_power() {
        let v = scenario_vehicle();
        let config = EnergyConfig::default();
        let mut previous = f64::NEG_INFINITY;
        for aux in [0.0, 0.5, 1.0, 2.0, 5.0] {
            let conditions = DrivingConditions { aux_power_kw: Some(aux), ..Default::default() };
            let kwh = segment_energy(90.0, 2000.0, -80.0, &v, &conditions, &config);
            assert!(kwh >= previous);
            previous = kwh;
        }
    }

    #[test]
    fn test_steep_descent_recovers_energy() {
        let mut v = scenario_vehicle();
        v.aux_power_kw = 0.0;
        let kwh = energy(50.0, 1000.0, -60.0, &v);
        assert!(kwh < 0.0, "got {}", kwh);
    }

    #[test]
    fn test_uphill_costs_more_than_flat() {
        let v = scenario_vehicle();
        assert!(energy(90.0, 1000.0, 30.0, &v) > energy(90.0, 1000.0, 0.0, &v));
    }

    #[test]
    fn test_slope_is_clamped() {
        let v = scenario_vehicle();
        // 100% and 500% grades both clamp to 50%
        let a = energy(50.0, 100.0, 100.0, &v);
        let b = energy(50.0, 100.0, 500.0, &v);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_zero_distance() {
        let v = scenario_vehicle();
        let kwh = energy(50.0, 0.0, 10.0, &v);
        assert_eq!(kwh, 0.0);
    }

    #[test]
    fn test_zero_motor_efficiency_is_finite() {
        let mut v = scenario_vehicle();
        v.motor_efficiency = 0.0;
        let kwh = energy(90.0, 1000.0, 0.0, &v);
        assert!(kwh.is_finite());
        assert!(kwh > 0.0);
    }

    #[test]
    fn test_conditions_override_vehicle() {
        let v = scenario_vehicle();
        let config = EnergyConfig::default();
        let heavy = DrivingConditions { total_mass_kg: Some(3000.0), ..Default::default() };
        let thin_air = DrivingConditions { air_density: Some(1.0), ..Default::default() };
        let base = segment_energy(90.0, 1000.0, 0.0, &v, &DrivingConditions::default(), &config);
        assert!(segment_energy(90.0, 1000.0, 0.0, &v, &heavy, &config) > base);
        assert!(segment_energy(90.0, 1000.0, 0.0, &v, &thin_air, &config) < base);
    }

    #[test]
    fn test_travel_time() {
        assert!((travel_time_s(1000.0, 36.0) - 100.0).abs() < 1e-9);
        assert_eq!(travel_time_s(1000.0, 0.0), 0.0);
    }
}
