//! End-to-end checks of the public API.

use eco_route::presets::{default_vehicle_profiles, demo_route};
use eco_route::{
    classify_road_type, decode_polyline5, eco_speed, encode_polyline5, haversine_distance,
    plan_route_from_coordinates, plan_trip, segment_energy, simulate_real_speed, DrivingConditions,
    EcoRouteError, EcoSpeedPolicy, EnergyConfig, GpsPoint, RoadClassRange, RoutePoint,
    TripParameters, VehicleProfile,
};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

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

#[test]
fn test_le_havre_pair_distance() {
    let d = haversine_distance(49.4944, 0.1079, 49.4850, 0.1300);
    assert!(approx_eq(d, 1908.0, 5.0), "got {}", d);
}

#[test]
fn test_motorway_energy_scenario() {
    let kwh = segment_energy(
        130.0,
        5000.0,
        0.0,
        &scenario_vehicle(),
        &DrivingConditions::default(),
        &EnergyConfig::default(),
    );
    assert!(kwh > 0.0 && kwh < 2.0, "got {}", kwh);
}

#[test]
fn test_motorway_link_with_user_max() {
    assert_eq!(classify_road_type(Some("motorway_link"), 110), 110.0);
}

#[test]
fn test_decoder_edge_cases() {
    assert!(decode_polyline5("", false).is_empty());
    assert!(decode_polyline5("", true).is_empty());

    let points = vec![
        GpsPoint::with_elevation(49.4944, 0.1079, 5.0),
        GpsPoint::with_elevation(48.8014, 2.1301, 135.0),
    ];
    let decoded = decode_polyline5(&encode_polyline5(&points, true), true);
    assert_eq!(decoded.len(), 2);
    for (a, b) in points.iter().zip(&decoded) {
        assert!(approx_eq(a.latitude, b.latitude, 1e-5));
        assert!(approx_eq(a.longitude, b.longitude, 1e-5));
    }
}

#[test]
fn test_eco_speed_bounds() {
    let policy = EcoSpeedPolicy::default();
    let vehicle = VehicleProfile::default();
    for limit in [30.0, 50.0, 70.0, 90.0, 110.0, 130.0] {
        for elevation in [-200.0, -20.0, 0.0, 20.0, 200.0] {
            let s = eco_speed(1000.0, elevation, limit, &vehicle, None, &policy);
            assert!(s <= limit, "{} above {}", s, limit);
            assert!(s >= policy.min_speed_kmh.min(limit));
        }
    }
}

#[test]
fn test_real_speed_reproducible() {
    let a: Vec<f64> = (0..30).map(|i| simulate_real_speed(110.0, 90.0, i)).collect();
    let b: Vec<f64> = (0..30).map(|i| simulate_real_speed(110.0, 90.0, i)).collect();
    assert_eq!(a, b);
}

#[test]
fn test_insufficient_points() {
    let vehicle = VehicleProfile::default();
    let single = vec![RoutePoint::new(49.0, 1.0, 0.0, 50.0)];
    let result = plan_trip(&single, &vehicle, &TripParameters::default());
    assert!(matches!(
        result,
        Err(EcoRouteError::InsufficientPoints { point_count: 1, minimum_required: 2 })
    ));
}

#[test]
fn test_demo_route_every_preset() {
    let route = demo_route();
    let params = TripParameters::default();

    for vehicle in default_vehicle_profiles() {
        let result = plan_trip(&route, &vehicle, &params).unwrap();
        let kpis = &result.kpis;

        assert!(result.total_distance_km > 100.0, "{}", vehicle.name);
        assert!(kpis.eco_energy > 0.0);
        assert!(kpis.eco_energy < kpis.limit_energy, "{} saves nothing", vehicle.name);
        assert!(kpis.extra_time > 0.0);
        assert!(kpis.eco_score >= 50 && kpis.eco_score <= 100);
        assert!(approx_eq(kpis.co2_avoided, kpis.energy_saved * 0.5, 1e-9));

        // 50 | 70 | 90 | 130 ... | 110 | 90 ... | 70 | 50 50
        let limits: Vec<f64> = result.segments.iter().map(|s| s.speed_limit).collect();
        assert_eq!(limits, vec![70.0, 90.0, 130.0, 110.0, 90.0, 70.0, 50.0]);
    }
}

#[test]
fn test_passengers_and_climate_cost_energy() {
    let route = demo_route();
    let vehicle = VehicleProfile::default();
    let base = plan_trip(&route, &vehicle, &TripParameters::default()).unwrap();
    let loaded = plan_trip(
        &route,
        &vehicle,
        &TripParameters {
            passengers: 4,
            climate_enabled: true,
            climate_intensity: 1.0,
            ..Default::default()
        },
    )
    .unwrap();

    assert!(loaded.kpis.limit_energy > base.kpis.limit_energy);
}

#[test]
fn test_coordinates_with_road_classes() {
    let coords: Vec<GpsPoint> = (0..6)
        .map(|i| GpsPoint::with_elevation(49.0 + i as f64 * 0.01, 1.0, 20.0))
        .collect();
    let ranges = vec![
        RoadClassRange::new(0, 2, "motorway_link"),
        RoadClassRange::new(2, 5, "residential"),
    ];
    let params = TripParameters { max_speed_kmh: 110, ..Default::default() };
    let result =
        plan_route_from_coordinates(&coords, &ranges, &VehicleProfile::default(), &params).unwrap();

    // Points 0..=2 at 110, 3..=5 at 50; records take the end point's limit
    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].speed_limit, 110.0);
    assert_eq!(result.segments[1].speed_limit, 50.0);
    assert!(result.segments.iter().all(|s| s.eco_speed <= s.speed_limit));
}

#[cfg(feature = "serde")]
#[test]
fn test_result_serializes() {
    let result = plan_trip(&demo_route(), &VehicleProfile::default(), &TripParameters::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["segments"].as_array().is_some_and(|s| !s.is_empty()));
    assert!(json["kpis"]["eco_score"].is_u64());
}
