//! Reproducible stand-in for a real driver's speed.
//!
//! Each segment gets its own `ChaCha8Rng` seeded from the segment index, so the
//! same index always yields the same speed and concurrent route computations
//! share no generator state.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::eco_speed::round_tenth;

/// Typical cruising fraction of the legal limit.
const BASE_FRACTION: f64 = 0.92;
/// Uniform variation range around the base speed.
const VARIATION_MIN: f64 = -0.10;
const VARIATION_MAX: f64 = 0.05;
/// Drivers rarely exceed the limit by more than 5%.
const MAX_OVER_LIMIT: f64 = 1.05;
/// Speed floor of the simulation (km/h).
const MIN_REAL_SPEED_KMH: f64 = 50.0;

/// Simulated driver speed (km/h) for one segment, rounded to 0.1 km/h.
///
/// The result is `limit * 0.92 * (1 + u)` with `u` uniform in `[-0.10, 0.05]`,
/// clamped to `[50, limit * 1.05]`. The 50 km/h floor is applied last, so on
/// roads limited below ~48 km/h the floor wins. `_eco_speed_kmh` is accepted
/// for call-site symmetry and does not influence the result.
///
/// ```rust
/// use eco_route::real_speed::simulate_real_speed;
///
/// let a = simulate_real_speed(130.0, 114.4, 7);
/// let b = simulate_real_speed(130.0, 90.0, 7);
/// assert_eq!(a, b);
/// assert!(a >= 50.0 && a <= 130.0 * 1.05);
/// ```
pub fn simulate_real_speed(speed_limit_kmh: f64, _eco_speed_kmh: f64, segment_index: u64) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(segment_index);
    let variation: f64 = rng.gen_range(VARIATION_MIN..=VARIATION_MAX);

    let base = speed_limit_kmh * BASE_FRACTION;
    let speed = (base * (1.0 + variation))
        .min(speed_limit_kmh * MAX_OVER_LIMIT)
        .max(MIN_REAL_SPEED_KMH);

    round_tenth(speed)
}
