//! HTTP client for a GraphHopper-compatible geocoding and routing API.
//!
//! This module provides:
//! - Connection pooling with request timeouts
//! - Concurrent geocoding of both trip endpoints
//! - Automatic retry with exponential backoff on 429
//! - Decoding of elevation-aware polylines and road class details

use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use crate::error::{EcoRouteError, Result};
use crate::polyline::decode_polyline5;
use crate::road_type::RoadClassRange;
use crate::GpsPoint;

const DEFAULT_BASE_URL: &str = "https://graphhopper.com/api/1";
const ROUTING_PROFILE: &str = "car";
const MAX_RETRIES: u32 = 3;
const MAX_IDLE_PER_HOST: usize = 8;

/// A route as returned by the routing service, before any energy modelling.
#[derive(Debug, Clone)]
pub struct FetchedRoute {
    pub coordinates: Vec<GpsPoint>,
    pub road_classes: Vec<RoadClassRange>,
    /// Meters, as reported by the service
    pub distance_m: f64,
    /// Milliseconds, as reported by the service
    pub time_ms: u64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    hits: Vec<GeocodeHit>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    point: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    paths: Vec<ApiPath>,
}

#[derive(Debug, Deserialize)]
struct ApiPath {
    points: String,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    time: u64,
    #[serde(default)]
    details: ApiDetails,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDetails {
    #[serde(default)]
    road_class: Vec<(u32, u32, String)>,
}

/// Exponential backoff for consecutive 429s: 1s, 2s, 4s max
fn backoff_for(consecutive_429s: u32) -> Duration {
    Duration::from_millis(500 * (1 << consecutive_429s.min(3)))
}

fn parse_route(response: RouteResponse) -> Result<FetchedRoute> {
    let path = response
        .paths
        .into_iter()
        .next()
        .ok_or_else(|| EcoRouteError::Routing("response contains no path".to_string()))?;

    let coordinates = decode_polyline5(&path.points, true);
    if coordinates.len() < 2 {
        return Err(EcoRouteError::Routing(format!(
            "route has {} points, at least 2 are required",
            coordinates.len()
        )));
    }

    let road_classes = path
        .details
        .road_class
        .into_iter()
        .map(|(start, end, class)| RoadClassRange::new(start, end, class))
        .collect();

    Ok(FetchedRoute {
        coordinates,
        road_classes,
        distance_m: path.distance,
        time_ms: path.time,
    })
}

/// Client for the geocoding and routing endpoints.
pub struct RouteFetcher {
    client: Client,
    api_key: String,
    base_url: String,
    consecutive_429s: AtomicU32,
}

impl RouteFetcher {
    /// Create a fetcher for the public GraphHopper API with the given key
    pub fn new(api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            consecutive_429s: AtomicU32::new(0),
        })
    }

    /// Point the fetcher at another compatible server (self-hosted, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_success(&self) {
        self.consecutive_429s.store(0, Ordering::Relaxed);
    }

    fn record_429(&self) -> Duration {
        let count = self.consecutive_429s.fetch_add(1, Ordering::Relaxed) + 1;
        let backoff = backoff_for(count);
        warn!("[RouteFetcher] Got 429! Consecutive: {}, backing off {:?}", count, backoff);
        backoff
    }

    /// Send a GET built by `build`, retrying 429s, and decode the JSON body.
    async fn get_json<T, F>(&self, what: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut retries = 0;
        let start = Instant::now();

        loop {
            let response = build(&self.client).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(EcoRouteError::Routing(format!(
                        "{}: max retries exceeded (429)",
                        what
                    )));
                }
                let wait = self.record_429();
                tokio::time::sleep(wait).await;
                continue;
            }

            self.record_success();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EcoRouteError::Routing(format!("{}: HTTP {} {}", what, status, body)));
            }

            let bytes = response.bytes().await?;
            debug!(
                "[RouteFetcher] {} answered in {:?} ({:.1}KB)",
                what,
                start.elapsed(),
                bytes.len() as f64 / 1024.0
            );

            return serde_json::from_slice(&bytes)
                .map_err(|e| EcoRouteError::Routing(format!("{}: JSON parse error: {}", what, e)));
        }
    }

    /// Resolve an address to its first geocoding hit.
    pub async fn geocode(&self, address: &str) -> Result<GpsPoint> {
        let url = format!("{}/geocode", self.base_url);
        let response: GeocodeResponse = self
            .get_json("geocode", |client| {
                client.get(&url).query(&[
                    ("q", address),
                    ("limit", "1"),
                    ("key", self.api_key.as_str()),
                ])
            })
            .await?;

        let hit = response
            .hits
            .into_iter()
            .next()
            .ok_or_else(|| EcoRouteError::AddressNotFound(address.to_string()))?;

        debug!("[RouteFetcher] '{}' -> {:.5}, {:.5}", address, hit.point.lat, hit.point.lng);
        Ok(GpsPoint::new(hit.point.lat, hit.point.lng))
    }

    /// Fetch the driving route between two points, with elevation and road classes.
    pub async fn fetch_route(&self, start: GpsPoint, end: GpsPoint) -> Result<FetchedRoute> {
        let url = format!("{}/route", self.base_url);
        let from = format!("{},{}", start.latitude, start.longitude);
        let to = format!("{},{}", end.latitude, end.longitude);

        let response: RouteResponse = self
            .get_json("route", |client| {
                client.get(&url).query(&[
                    ("point", from.as_str()),
                    ("point", to.as_str()),
                    ("profile", ROUTING_PROFILE),
                    ("points_encoded", "true"),
                    ("elevation", "true"),
                    ("details", "road_class"),
                    ("key", self.api_key.as_str()),
                ])
            })
            .await?;

        let route = parse_route(response)?;
        info!(
            "[RouteFetcher] Route: {} points, {} road class ranges, {:.1} km",
            route.coordinates.len(),
            route.road_classes.len(),
            route.distance_m / 1000.0
        );
        Ok(route)
    }

    /// Geocode both addresses concurrently, then fetch the route between them.
    pub async fn fetch_route_between(&self, start_address: &str, end_address: &str) -> Result<FetchedRoute> {
        let (start, end) =
            futures::try_join!(self.geocode(start_address), self.geocode(end_address))?;
        self.fetch_route(start, end).await
    }
}

/// Synchronous wrapper for FFI - runs the async code on a tokio runtime
#[cfg(feature = "ffi")]
pub fn fetch_and_plan_sync(
    api_key: &str,
    start_address: &str,
    end_address: &str,
    vehicle: &crate::VehicleProfile,
    params: &crate::TripParameters,
) -> Result<crate::RouteResult> {
    use tokio::runtime::Builder;

    let rt = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|e| EcoRouteError::Routing(format!("Runtime error: {}", e)))?;

    let fetcher = RouteFetcher::new(api_key)?;
    let route = rt.block_on(fetcher.fetch_route_between(start_address, end_address))?;

    crate::plan_route_from_coordinates(&route.coordinates, &route.road_classes, vehicle, params)
}
