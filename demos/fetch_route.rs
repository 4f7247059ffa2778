//! Fetch a real route from a GraphHopper-compatible API and plan it.
//!
//! Run with: GRAPHHOPPER_API_KEY=... cargo run --example fetch_route --features http -- "Le Havre" "Versailles"

use eco_route::{plan_route_from_coordinates, RouteFetcher, TripParameters, VehicleProfile};

#[tokio::main]
async fn main() -> eco_route::Result<()> {
    let mut args = std::env::args().skip(1);
    let start = args.next().unwrap_or_else(|| "Le Havre".to_string());
    let end = args.next().unwrap_or_else(|| "Versailles".to_string());
    let api_key = std::env::var("GRAPHHOPPER_API_KEY").unwrap_or_default();

    let mut fetcher = RouteFetcher::new(&api_key)?;
    if let Ok(base_url) = std::env::var("GRAPHHOPPER_URL") {
        fetcher = fetcher.with_base_url(&base_url);
    }

    let route = fetcher.fetch_route_between(&start, &end).await?;
    println!(
        "{} -> {}: {} points, {} road class ranges",
        start,
        end,
        route.coordinates.len(),
        route.road_classes.len()
    );

    let params = TripParameters {
        display_tolerance_deg: Some(0.0005),
        ..Default::default()
    };
    let result = plan_route_from_coordinates(
        &route.coordinates,
        &route.road_classes,
        &VehicleProfile::default(),
        &params,
    )?;

    println!(
        "{} segments, {:.1} km, eco {:.2} kWh vs limit {:.2} kWh (score {})",
        result.segments.len(),
        result.total_distance_km,
        result.kpis.eco_energy,
        result.kpis.limit_energy,
        result.kpis.eco_score
    );
    Ok(())
}
