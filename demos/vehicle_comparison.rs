//! Compare the preset vehicles on the demo route in parallel.
//!
//! Run with: cargo run --example vehicle_comparison --features parallel

use eco_route::presets::{default_vehicle_profiles, demo_route};
use eco_route::{plan_trips_parallel, TripParameters};

fn main() {
    let points = demo_route();
    let vehicles = default_vehicle_profiles();
    let params = TripParameters::default();

    let start = std::time::Instant::now();
    let results = plan_trips_parallel(&points, &vehicles, &params);
    let elapsed = start.elapsed();

    println!("{} vehicles on the demo route in {:?}\n", vehicles.len(), elapsed);
    for (vehicle, result) in vehicles.iter().zip(results) {
        match result {
            Ok(r) => println!(
                "{:<14} eco {:>6.2} kWh | limit {:>6.2} kWh | saved {:>5.1}% | +{:.1} min | {:.1} kWh/100km",
                vehicle.name,
                r.kpis.eco_energy,
                r.kpis.limit_energy,
                r.kpis.energy_saved_percent,
                r.kpis.extra_time,
                r.kpis.eco_energy / r.total_distance_km * 100.0
            ),
            Err(e) => println!("{:<14} failed: {}", vehicle.name, e),
        }
    }
}
