//! Eco-speed plan for the built-in Le Havre to Versailles route.
//!
//! Run with: cargo run --example demo_route

use eco_route::presets::{default_vehicle_profiles, demo_route};
use eco_route::{plan_trip, TripParameters};

fn main() {
    let points = demo_route();
    let vehicle = &default_vehicle_profiles()[0];
    let params = TripParameters {
        passengers: 1,
        climate_enabled: true,
        ..Default::default()
    };

    let result = match plan_trip(&points, vehicle, &params) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Planning failed: {}", e);
            return;
        }
    };

    println!("Demo route with {} ({} points)\n", vehicle.name, points.len());
    println!(
        "{:>3} {:>8} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9}",
        "#", "km", "limit", "eco", "real", "limit kWh", "eco kWh", "real kWh"
    );
    for s in &result.segments {
        println!(
            "{:>3} {:>8.2} {:>6.0} {:>6.1} {:>6.1} {:>9.3} {:>9.3} {:>9.3}",
            s.index,
            s.distance / 1000.0,
            s.speed_limit,
            s.eco_speed,
            s.real_speed,
            s.limit_energy,
            s.eco_energy,
            s.real_energy
        );
    }

    let k = &result.kpis;
    println!("\nTotal distance: {:.2} km", result.total_distance_km);
    println!("Energy: eco {:.2} kWh, limit {:.2} kWh, real {:.2} kWh", k.eco_energy, k.limit_energy, k.real_energy);
    println!("Saved vs limit: {:.2} kWh ({:.1}%)", k.energy_saved, k.energy_saved_percent);
    println!("Saved vs real driver: {:.2} kWh ({:.1}%)", k.energy_saved_vs_real, k.energy_saved_vs_real_percent);
    println!("Extra time: {:.1} min, CO2 avoided: {:.2} kg, eco score: {}", k.extra_time, k.co2_avoided, k.eco_score);
}
