//! # Polyline5 Codec
//!
//! Decodes the compact ASCII geometry returned by routing services into
//! [`GpsPoint`]s. Every value is a signed delta from the previous point, split
//! into 5-bit groups offset by 63 so that each group is a printable character.
//! Bit `0x20` of a group marks that another group follows.
//!
//! Positions are stored at 1e-5 degree precision. When elevation is encoded,
//! every point carries a third value at 1e-2 meter precision.
//!
//! ## Example
//!
//! ```rust
//! use eco_route::polyline::decode_polyline5;
//!
//! let points = decode_polyline5("_p~iF~ps|U_ulLnnqC_mqNvxq`@", false);
//! assert_eq!(points.len(), 3);
//! assert!((points[0].latitude - 38.5).abs() < 1e-9);
//! assert!((points[0].longitude - (-120.2)).abs() < 1e-9);
//! ```

use crate::GpsPoint;

const CHAR_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const GROUP_MASK: u64 = 0x1f;

const POSITION_FACTOR: f64 = 1e5;
const ELEVATION_FACTOR: f64 = 1e2;

/// Lazy decoder over an encoded polyline.
///
/// Yields one point per decoded coordinate and stops when the input is
/// exhausted. A trailing latitude without a longitude is dropped.
pub struct Polyline5Decoder<'a> {
    bytes: &'a [u8],
    index: usize,
    has_elevation: bool,
    lat: i64,
    lon: i64,
    elev: i64,
}

impl<'a> Polyline5Decoder<'a> {
    pub fn new(encoded: &'a str, has_elevation: bool) -> Self {
        Self {
            bytes: encoded.as_bytes(),
            index: 0,
            has_elevation,
            lat: 0,
            lon: 0,
            elev: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.index >= self.bytes.len()
    }

    /// Read one variable-length value and convert it to a signed delta.
    fn next_delta(&mut self) -> i64 {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        while let Some(&byte) = self.bytes.get(self.index) {
            self.index += 1;
            let group = u64::from(byte.saturating_sub(CHAR_OFFSET));
            // Groups past 64 bits carry nothing representable
            if shift < 64 {
                result |= (group & GROUP_MASK) << shift;
                shift += 5;
            }
            if group & CONTINUATION_BIT == 0 {
                break;
            }
        }

        let magnitude = (result >> 1) as i64;
        if result & 1 == 1 {
            !magnitude
        } else {
            magnitude
        }
    }
}

impl Iterator for Polyline5Decoder<'_> {
    type Item = GpsPoint;

    fn next(&mut self) -> Option<GpsPoint> {
        if self.exhausted() {
            return None;
        }

        self.lat = self.lat.wrapping_add(self.next_delta());
        if self.exhausted() {
            // Latitude without longitude: incomplete coordinate.
            self.index = self.bytes.len();
            return None;
        }
        self.lon = self.lon.wrapping_add(self.next_delta());

        let latitude = self.lat as f64 / POSITION_FACTOR;
        let longitude = self.lon as f64 / POSITION_FACTOR;

        if self.has_elevation && !self.exhausted() {
            self.elev = self.elev.wrapping_add(self.next_delta());
            Some(GpsPoint::with_elevation(
                latitude,
                longitude,
                self.elev as f64 / ELEVATION_FACTOR,
            ))
        } else {
            Some(GpsPoint::new(latitude, longitude))
        }
    }
}

/// Decode an encoded polyline into a list of points.
///
/// Empty input yields an empty list.
pub fn decode_polyline5(encoded: &str, has_elevation: bool) -> Vec<GpsPoint> {
    Polyline5Decoder::new(encoded, has_elevation).collect()
}

/// Encode points into a polyline, the inverse of [`decode_polyline5`].
///
/// Points without elevation are encoded at 0 m when `has_elevation` is set.
pub fn encode_polyline5(points: &[GpsPoint], has_elevation: bool) -> String {
    let mut out = String::with_capacity(points.len() * if has_elevation { 12 } else { 8 });
    let (mut prev_lat, mut prev_lon, mut prev_elev) = (0i64, 0i64, 0i64);

    for p in points {
        let lat = (p.latitude * POSITION_FACTOR).round() as i64;
        let lon = (p.longitude * POSITION_FACTOR).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lon - prev_lon, &mut out);
        prev_lat = lat;
        prev_lon = lon;

        if has_elevation {
            let elev = (p.elevation.unwrap_or(0.0) * ELEVATION_FACTOR).round() as i64;
            encode_value(elev - prev_elev, &mut out);
            prev_elev = elev;
        }
    }

    out
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 {
        !((delta as u64) << 1)
    } else {
        (delta as u64) << 1
    };

    while value >= CONTINUATION_BIT {
        out.push((((value & GROUP_MASK) | CONTINUATION_BIT) as u8 + CHAR_OFFSET) as char);
        value >>= 5;
    }
    out.push((value as u8 + CHAR_OFFSET) as char);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_polyline5("", false).is_empty());
        assert!(decode_polyline5("", true).is_empty());
    }

    #[test]
    fn test_decode_reference_polyline() {
        // Canonical example of the polyline format
        let points = decode_polyline5("_p~iF~ps|U_ulLnnqC_mqNvxq`@", false);
        assert_eq!(points.len(), 3);
        assert!(approx_eq(points[0].latitude, 38.5, 1e-9));
        assert!(approx_eq(points[0].longitude, -120.2, 1e-9));
        assert!(approx_eq(points[1].latitude, 40.7, 1e-9));
        assert!(approx_eq(points[1].longitude, -120.95, 1e-9));
        assert!(approx_eq(points[2].latitude, 43.252, 1e-9));
        assert!(approx_eq(points[2].longitude, -126.453, 1e-9));
        assert!(points.iter().all(|p| p.elevation.is_none()));
    }

    #[test]
    fn test_truncated_coordinate_dropped() {
        // Append a lone latitude delta ("_p~iF") after two full points
        let points = decode_polyline5("_p~iF~ps|U_ulLnnqC_p~iF", false);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_single_latitude_only() {
        assert!(decode_polyline5("_p~iF", false).is_empty());
    }

    #[test]
    fn test_round_trip_with_elevation() {
        let points = vec![
            GpsPoint::with_elevation(49.4944, 0.1079, 5.0),
            GpsPoint::with_elevation(49.4850, 0.1300, 8.25),
            GpsPoint::with_elevation(49.4700, 0.1600, -3.5),
            GpsPoint::with_elevation(48.8014, 2.1301, 135.0),
        ];
        let encoded = encode_polyline5(&points, true);
        let decoded = decode_polyline5(&encoded, true);

        assert_eq!(decoded.len(), points.len());
        for (a, b) in points.iter().zip(&decoded) {
            assert!(approx_eq(a.latitude, b.latitude, 1e-6));
            assert!(approx_eq(a.longitude, b.longitude, 1e-6));
            assert!(approx_eq(a.elevation.unwrap(), b.elevation.unwrap(), 1e-6));
        }
    }

    #[test]
    fn test_missing_final_elevation_still_emits_point() {
        let points = vec![
            GpsPoint::with_elevation(10.0, 20.0, 100.0),
            GpsPoint::with_elevation(10.1, 20.1, 110.0),
        ];
        // Only the first point carries elevation in the stream
        let flat = encode_polyline5(&points, false);
        let head = encode_polyline5(&points[..1], false);
        let first = encode_polyline5(&points[..1], true);
        let mixed = format!("{}{}", first, &flat[head.len()..]);

        let decoded = decode_polyline5(&mixed, true);
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].elevation.is_some());
        assert!(decoded[1].elevation.is_none());
    }

    #[test]
    fn test_decoder_is_lazy_iterator() {
        let mut decoder = Polyline5Decoder::new("_p~iF~ps|U_ulLnnqC_mqNvxq`@", false);
        assert!(decoder.next().is_some());
        assert!(decoder.next().is_some());
        assert!(decoder.next().is_some());
        assert!(decoder.next().is_none());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_encode_negative_values() {
        let points = vec![GpsPoint::new(-33.86785, 151.20732), GpsPoint::new(-34.0, 150.5)];
        let decoded = decode_polyline5(&encode_polyline5(&points, false), false);
        assert!(approx_eq(decoded[0].latitude, -33.86785, 1e-9));
        assert!(approx_eq(decoded[1].longitude, 150.5, 1e-9));
    }

    #[test]
    fn test_oversized_deltas_do_not_panic() {
        // "}" + 11 × "~" + "N" encodes a latitude delta of i64::MAX
        let big = format!("}}{}N", "~".repeat(11));
        let encoded = format!("{big}?{big}?");
        let points = decode_polyline5(&encoded, false);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.latitude.is_finite()));
    }

    #[test]
    fn test_long_continuation_run_terminates() {
        // Thousands of continuation groups, then a terminator and a longitude
        let encoded = format!("{}??", "~".repeat(5000));
        let points = decode_polyline5(&encoded, true);
        assert_eq!(points.len(), 1);
        assert!(points[0].latitude.is_finite());
        assert!(points[0].elevation.is_none());
    }
}
