//! # Segmentation & Merge Engine
//!
//! Turns an ordered list of [`RoutePoint`]s into coarse segments, each with
//! distance, time and energy for three driving scenarios: at the legal limit,
//! at the recommended eco speed, and at a simulated real driver speed.
//!
//! ## Algorithm
//! 1. One record per consecutive point pair. The second point of the pair
//!    governs the speed limit; the elevation delta is `end - start`.
//! 2. A single left-to-right fold keeps one open group and closes it when the
//!    speed limit changes by 0.1 km/h or more.
//! 3. A closed group becomes one [`Segment`]: distance, energy and time are
//!    summed, eco and real speeds are distance-weighted averages, elevation
//!    and coordinates span from the first record's start to the last record's
//!    end, and indices are reassigned from 0.
//!
//! Records are merged as they are produced, so arbitrarily long routes never
//! buffer more than the open group's running sums.

use crate::eco_speed::{eco_speed, EcoSpeedPolicy};
use crate::energy::{segment_energy, travel_time_s, DrivingConditions, EnergyConfig};
use crate::geo_utils::haversine_distance;
use crate::real_speed::simulate_real_speed;
use crate::{RoutePoint, VehicleProfile};

/// Two limits closer than this belong to the same merged segment (km/h).
pub const SPEED_LIMIT_TOLERANCE_KMH: f64 = 0.1;

/// A stretch of route with its three driving scenarios.
///
/// Produced once per point pair, then merged over runs of equal speed limit.
/// Energies are in kWh (negative = net recovery), times in seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub index: u32,
    /// Meters
    pub distance: f64,
    pub elevation_start: f64,
    pub elevation_end: f64,
    /// km/h
    pub speed_limit: f64,
    /// km/h, never above `speed_limit`
    pub eco_speed: f64,
    /// km/h
    pub real_speed: f64,
    pub limit_energy: f64,
    pub eco_energy: f64,
    pub real_energy: f64,
    pub limit_time: f64,
    pub eco_time: f64,
    pub real_time: f64,
    pub lat_start: f64,
    pub lon_start: f64,
    pub lat_end: f64,
    pub lon_end: f64,
}

/// Everything a segment computation needs besides the points themselves.
#[derive(Debug, Clone, Copy)]
pub struct SegmentContext<'a> {
    pub vehicle: &'a VehicleProfile,
    pub conditions: &'a DrivingConditions,
    pub energy: &'a EnergyConfig,
    pub policy: &'a EcoSpeedPolicy,
}

/// Compute the unmerged record for the pair `start → end`.
pub fn segment_record(
    index: usize,
    start: &RoutePoint,
    end: &RoutePoint,
    ctx: &SegmentContext<'_>,
) -> Segment {
    let distance = haversine_distance(start.latitude, start.longitude, end.latitude, end.longitude);
    let elevation_change = end.elevation - start.elevation;
    let speed_limit = end.speed_limit_kmh;

    let eco = eco_speed(
        distance,
        elevation_change,
        speed_limit,
        ctx.vehicle,
        Some(ctx.conditions.total_mass_kg(ctx.vehicle)),
        ctx.policy,
    );
    let real = simulate_real_speed(speed_limit, eco, index as u64);

    let energy_at = |speed: f64| {
        segment_energy(speed, distance, elevation_change, ctx.vehicle, ctx.conditions, ctx.energy)
    };

    Segment {
        index: index as u32,
        distance,
        elevation_start: start.elevation,
        elevation_end: end.elevation,
        speed_limit,
        eco_speed: eco,
        real_speed: real,
        limit_energy: energy_at(speed_limit),
        eco_energy: energy_at(eco),
        real_energy: energy_at(real),
        limit_time: travel_time_s(distance, speed_limit),
        eco_time: travel_time_s(distance, eco),
        real_time: travel_time_s(distance, real),
        lat_start: start.latitude,
        lon_start: start.longitude,
        lat_end: end.latitude,
        lon_end: end.longitude,
    }
}

/// Lazily compute one record per consecutive point pair.
pub fn segment_records<'a>(
    points: &'a [RoutePoint],
    ctx: SegmentContext<'a>,
) -> impl Iterator<Item = Segment> + 'a {
    points
        .windows(2)
        .enumerate()
        .map(move |(i, pair)| segment_record(i, &pair[0], &pair[1], &ctx))
}

/// All unmerged per-pair records, in route order.
pub fn build_segment_records(points: &[RoutePoint], ctx: SegmentContext<'_>) -> Vec<Segment> {
    segment_records(points, ctx).collect()
}

/// Build the merged segment list for a route.
///
/// Fewer than two points yield an empty list; rejecting such routes is the
/// request layer's job.
pub fn build_segments(points: &[RoutePoint], ctx: SegmentContext<'_>) -> Vec<Segment> {
    let mut merger = SegmentMerger::with_capacity(points.len().saturating_sub(1).min(64));
    for record in segment_records(points, ctx) {
        merger.push(record);
    }
    merger.finish()
}

/// Merge an already computed record sequence.
pub fn merge_segments<I>(records: I) -> Vec<Segment>
where
    I: IntoIterator<Item = Segment>,
{
    let mut merger = SegmentMerger::default();
    for record in records {
        merger.push(record);
    }
    merger.finish()
}

// =============================================================================
// Streaming merge
// =============================================================================

/// Running sums of one open group of same-limit records.
#[derive(Debug, Clone)]
struct OpenGroup {
    first: Segment,
    distance: f64,
    eco_weighted: f64,
    real_weighted: f64,
    limit_energy: f64,
    eco_energy: f64,
    real_energy: f64,
    limit_time: f64,
    eco_time: f64,
    real_time: f64,
    elevation_end: f64,
    lat_end: f64,
    lon_end: f64,
}

impl OpenGroup {
    fn open(record: Segment) -> Self {
        let mut group = Self {
            distance: 0.0,
            eco_weighted: 0.0,
            real_weighted: 0.0,
            limit_energy: 0.0,
            eco_energy: 0.0,
            real_energy: 0.0,
            limit_time: 0.0,
            eco_time: 0.0,
            real_time: 0.0,
            elevation_end: record.elevation_end,
            lat_end: record.lat_end,
            lon_end: record.lon_end,
            first: record.clone(),
        };
        group.absorb(&record);
        group
    }

    fn accepts(&self, record: &Segment) -> bool {
        (record.speed_limit - self.first.speed_limit).abs() < SPEED_LIMIT_TOLERANCE_KMH
    }

    fn absorb(&mut self, record: &Segment) {
        self.distance += record.distance;
        self.eco_weighted += record.eco_speed * record.distance;
        self.real_weighted += record.real_speed * record.distance;
        self.limit_energy += record.limit_energy;
        self.eco_energy += record.eco_energy;
        self.real_energy += record.real_energy;
        self.limit_time += record.limit_time;
        self.eco_time += record.eco_time;
        self.real_time += record.real_time;
        self.elevation_end = record.elevation_end;
        self.lat_end = record.lat_end;
        self.lon_end = record.lon_end;
    }

    fn close(self, index: u32) -> Segment {
        let (eco_speed, real_speed) = if self.distance > 0.0 {
            (
                // Members may sit up to the tolerance above the group limit.
                (self.eco_weighted / self.distance).min(self.first.speed_limit),
                self.real_weighted / self.distance,
            )
        } else {
            (self.first.eco_speed, self.first.real_speed)
        };

        Segment {
            index,
            distance: self.distance,
            elevation_start: self.first.elevation_start,
            elevation_end: self.elevation_end,
            speed_limit: self.first.speed_limit,
            eco_speed,
            real_speed,
            limit_energy: self.limit_energy,
            eco_energy: self.eco_energy,
            real_energy: self.real_energy,
            limit_time: self.limit_time,
            eco_time: self.eco_time,
            real_time: self.real_time,
            lat_start: self.first.lat_start,
            lon_start: self.first.lon_start,
            lat_end: self.lat_end,
            lon_end: self.lon_end,
        }
    }
}

/// Left-to-right fold that merges consecutive records sharing a speed limit.
///
/// ```rust
/// use eco_route::segments::{Segment, SegmentMerger};
///
/// let record = |limit: f64, distance: f64| Segment {
///     index: 0, distance, elevation_start: 0.0, elevation_end: 0.0,
///     speed_limit: limit, eco_speed: limit * 0.88, real_speed: limit * 0.92,
///     limit_energy: 0.1, eco_energy: 0.08, real_energy: 0.09,
///     limit_time: 10.0, eco_time: 11.0, real_time: 10.5,
///     lat_start: 0.0, lon_start: 0.0, lat_end: 0.0, lon_end: 0.0,
/// };
///
/// let mut merger = SegmentMerger::default();
/// merger.push(record(90.0, 100.0));
/// merger.push(record(90.0, 300.0));
/// merger.push(record(50.0, 200.0));
/// let merged = merger.finish();
///
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].distance, 400.0);
/// assert_eq!(merged[1].index, 1);
/// ```
#[derive(Debug, Default)]
pub struct SegmentMerger {
    open: Option<OpenGroup>,
    merged: Vec<Segment>,
}

impl SegmentMerger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            open: None,
            merged: Vec::with_capacity(capacity),
        }
    }

    /// Feed the next record in route order.
    pub fn push(&mut self, record: Segment) {
        match self.open.as_mut() {
            Some(group) if group.accepts(&record) => group.absorb(&record),
            _ => {
                self.close_open_group();
                self.open = Some(OpenGroup::open(record));
            }
        }
    }

    /// Close the last group and return the merged segments.
    pub fn finish(mut self) -> Vec<Segment> {
        self.close_open_group();
        self.merged
    }

    fn close_open_group(&mut self) {
        if let Some(group) = self.open.take() {
            let index = self.merged.len() as u32;
            self.merged.push(group.close(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn vehicle() -> VehicleProfile {
        VehicleProfile::default()
    }

    fn point(lat: f64, lon: f64, elevation: f64, limit: f64) -> RoutePoint {
        RoutePoint { latitude: lat, longitude: lon, elevation, speed_limit_kmh: limit }
    }

    /// Points 0.01° apart along a meridian with the given limits.
    fn straight_route(limits: &[f64]) -> Vec<RoutePoint> {
        limits
            .iter()
            .enumerate()
            .map(|(i, &limit)| point(49.0 + i as f64 * 0.01, 1.0, 10.0 + i as f64, limit))
            .collect()
    }

    fn sum(segments: &[Segment], field: impl Fn(&Segment) -> f64) -> f64 {
        segments.iter().map(field).sum()
    }

    fn with_ctx<R>(f: impl FnOnce(SegmentContext<'_>) -> R) -> R {
        let v = vehicle();
        let conditions = DrivingConditions::default();
        let energy = EnergyConfig::default();
        let policy = EcoSpeedPolicy::default();
        f(SegmentContext { vehicle: &v, conditions: &conditions, energy: &energy, policy: &policy })
    }

    #[test]
    fn test_empty_and_single_point() {
        with_ctx(|ctx| {
            assert!(build_segments(&[], ctx).is_empty());
            assert!(build_segments(&[point(49.0, 1.0, 0.0, 50.0)], ctx).is_empty());
        });
    }

    #[test]
    fn test_record_uses_second_point() {
        with_ctx(|ctx| {
            let a = point(49.0, 1.0, 10.0, 50.0);
            let b = point(49.01, 1.0, 40.0, 90.0);
            let r = segment_record(0, &a, &b, &ctx);
            assert_eq!(r.speed_limit, 90.0);
            assert_eq!(r.elevation_start, 10.0);
            assert_eq!(r.elevation_end, 40.0);
            assert!(r.eco_speed <= r.speed_limit);
            assert!(approx_eq(r.limit_time, r.distance / (90.0 / 3.6), 1e-9));
            assert_eq!(r.lat_end, 49.01);
        });
    }

    #[test]
    fn test_uniform_limit_merges_to_one() {
        with_ctx(|ctx| {
            let route = straight_route(&[90.0; 8]);
            let merged = build_segments(&route, ctx);
            assert_eq!(merged.len(), 1);
            assert_eq!(merged[0].index, 0);
            assert_eq!(merged[0].elevation_start, 10.0);
            assert_eq!(merged[0].elevation_end, 17.0);
            assert_eq!(merged[0].lat_start, 49.0);
            assert!(approx_eq(merged[0].lat_end, 49.07, 1e-12));
        });
    }

    #[test]
    fn test_alternating_limits_do_not_merge() {
        with_ctx(|ctx| {
            let limits: Vec<f64> = (0..9).map(|i| if i % 2 == 0 { 50.0 } else { 90.0 }).collect();
            let route = straight_route(&limits);
            let merged = build_segments(&route, ctx);
            assert_eq!(merged.len(), route.len() - 1);
            for (i, s) in merged.iter().enumerate() {
                assert_eq!(s.index, i as u32);
            }
        });
    }

    #[test]
    fn test_merge_conserves_totals() {
        with_ctx(|ctx| {
            let route = straight_route(&[50.0, 50.0, 90.0, 90.0, 90.0, 130.0, 130.0, 50.0, 50.0]);
            let records = build_segment_records(&route, ctx);
            let merged = build_segments(&route, ctx);

            assert!(approx_eq(sum(&records, |s| s.distance), sum(&merged, |s| s.distance), 1e-6));
            assert!(approx_eq(sum(&records, |s| s.eco_energy), sum(&merged, |s| s.eco_energy), 1e-9));
            assert!(approx_eq(sum(&records, |s| s.real_energy), sum(&merged, |s| s.real_energy), 1e-9));
            assert!(approx_eq(sum(&records, |s| s.limit_time), sum(&merged, |s| s.limit_time), 1e-6));
            // 50 | 90 90 90 | 130 130 | 50 50 -> first record is governed by point 1 (50)
            assert_eq!(merged.len(), 4);
        });
    }

    #[test]
    fn test_weighted_speed_average() {
        let mut a = template(90.0);
        a.distance = 100.0;
        a.eco_speed = 60.0;
        a.real_speed = 80.0;
        let mut b = template(90.0);
        b.distance = 300.0;
        b.eco_speed = 80.0;
        b.real_speed = 90.0;

        let merged = merge_segments(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert!(approx_eq(merged[0].eco_speed, 75.0, 1e-9));
        assert!(approx_eq(merged[0].real_speed, 87.5, 1e-9));
    }

    #[test]
    fn test_zero_distance_group_falls_back_to_first_speed() {
        let mut a = template(50.0);
        a.distance = 0.0;
        a.eco_speed = 44.0;
        let mut b = template(50.0);
        b.distance = 0.0;
        b.eco_speed = 40.0;
        let merged = merge_segments(vec![a, b]);
        assert_eq!(merged[0].eco_speed, 44.0);
    }

    #[test]
    fn test_tolerance_on_limit_change() {
        let merged = merge_segments(vec![template(90.0), template(90.05), template(90.2)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].speed_limit, 90.0);
        assert_eq!(merged[1].speed_limit, 90.2);
    }

    fn template(limit: f64) -> Segment {
        Segment {
            index: 7,
            distance: 100.0,
            elevation_start: 0.0,
            elevation_end: 0.0,
            speed_limit: limit,
            eco_speed: limit * 0.88,
            real_speed: limit * 0.92,
            limit_energy: 0.02,
            eco_energy: 0.015,
            real_energy: 0.018,
            limit_time: 4.0,
            eco_time: 4.5,
            real_time: 4.2,
            lat_start: 0.0,
            lon_start: 0.0,
            lat_end: 0.0,
            lon_end: 0.0,
        }
    }
}
