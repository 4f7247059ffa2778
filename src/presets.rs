//! Built-in vehicle profiles and an offline demo route.

use crate::{RoutePoint, VehicleProfile};

/// Electronics and comfort baseline shared by the presets (kW).
const PRESET_AUX_POWER_KW: f64 = 1.0;

#[allow(clippy::too_many_arguments)]
fn preset(
    name: &str,
    empty_mass_kg: f64,
    drag_coefficient: f64,
    frontal_area_m2: f64,
    rolling_resistance: f64,
    motor_efficiency: f64,
    regen_efficiency: f64,
    battery_capacity_kwh: f64,
) -> VehicleProfile {
    VehicleProfile {
        name: name.to_string(),
        empty_mass_kg,
        extra_load_kg: 150.0,
        drag_area_m2: drag_coefficient * frontal_area_m2,
        rolling_resistance,
        motor_efficiency,
        regen_efficiency,
        aux_power_kw: PRESET_AUX_POWER_KW,
        battery_capacity_kwh,
    }
}

/// Tesla Model 3, Nissan Leaf, Renault Zoe and a generic "Custom" profile.
pub fn default_vehicle_profiles() -> Vec<VehicleProfile> {
    vec![
        preset("Tesla Model 3", 1611.0, 0.23, 2.22, 0.007, 0.90, 0.70, 57.5),
        preset("Nissan Leaf", 1580.0, 0.28, 2.27, 0.008, 0.87, 0.65, 40.0),
        preset("Renault Zoe", 1468.0, 0.29, 2.13, 0.0075, 0.88, 0.68, 52.0),
        VehicleProfile::default(),
    ]
}

/// (latitude, longitude, elevation m, speed limit km/h)
const DEMO_ROUTE: [(f64, f64, f64, f64); 40] = [
    // Le Havre, urban exit
    (49.4944, 0.1079, 5.0, 50.0),
    (49.4850, 0.1300, 8.0, 70.0),
    (49.4700, 0.1600, 12.0, 90.0),
    // A13
    (49.4500, 0.2200, 20.0, 130.0),
    (49.4300, 0.3000, 35.0, 130.0),
    (49.4100, 0.3800, 45.0, 130.0),
    (49.3900, 0.4600, 40.0, 130.0),
    (49.3700, 0.5400, 30.0, 130.0),
    (49.3500, 0.6200, 25.0, 130.0),
    (49.3300, 0.7000, 35.0, 130.0),
    (49.3100, 0.7800, 50.0, 130.0),
    (49.2900, 0.8600, 60.0, 130.0),
    (49.2700, 0.9400, 55.0, 130.0),
    (49.2500, 1.0200, 45.0, 130.0),
    (49.2300, 1.1000, 40.0, 130.0),
    (49.2100, 1.1800, 50.0, 130.0),
    (49.1900, 1.2600, 65.0, 130.0),
    (49.1700, 1.3400, 70.0, 130.0),
    (49.1500, 1.4200, 60.0, 130.0),
    (49.1300, 1.5000, 50.0, 130.0),
    (49.1100, 1.5800, 55.0, 130.0),
    (49.0900, 1.6600, 65.0, 130.0),
    (49.0700, 1.7400, 75.0, 130.0),
    (49.0500, 1.8200, 80.0, 130.0),
    (49.0300, 1.9000, 75.0, 130.0),
    (49.0100, 1.9800, 65.0, 130.0),
    (48.9900, 2.0600, 60.0, 130.0),
    (48.9700, 2.1400, 70.0, 130.0),
    (48.9500, 2.2200, 85.0, 130.0),
    (48.9300, 2.3000, 90.0, 130.0),
    (48.9100, 2.3800, 85.0, 130.0),
    // Approaching Versailles
    (48.8950, 2.4500, 80.0, 110.0),
    (48.8800, 2.5000, 75.0, 90.0),
    (48.8650, 2.5500, 70.0, 90.0),
    (48.8500, 2.6000, 80.0, 90.0),
    (48.8350, 2.6500, 95.0, 90.0),
    (48.8200, 2.7000, 110.0, 90.0),
    (48.8100, 2.7500, 120.0, 70.0),
    (48.8050, 2.8000, 130.0, 50.0),
    // Versailles center
    (48.8014, 2.1301, 135.0, 50.0),
];

/// A 40-point Le Havre to Versailles route with elevations and speed limits.
pub fn demo_route() -> Vec<RoutePoint> {
    DEMO_ROUTE
        .iter()
        .map(|&(lat, lon, elevation, limit)| RoutePoint::new(lat, lon, elevation, limit))
        .collect()
}
