use serde::{Deserialize, Serialize};

const EARTH_RADIUS_NM: f64 = 3_440.065;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Great-circle (haversine) distance in nautical miles.
pub fn distance_nm(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Straight-line interpolation between two positions; `t` is clamped to [0, 1].
pub fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let t = t.clamp(0.0, 1.0);
    GeoPoint {
        lat: a.lat + (b.lat - a.lat) * t,
        lng: a.lng + (b.lng - a.lng) * t,
    }
}

/// Initial bearing from `a` to `b` in degrees [0, 360). Returns `None` when the
/// points coincide and no heading can be derived.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    if (a.lat - b.lat).abs() < 1e-12 && (a.lng - b.lng).abs() < 1e-12 {
        return None;
    }
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    Some((y.atan2(x).to_degrees() + 360.0) % 360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn london_paris_is_about_190_nm() {
        let lhr = GeoPoint::new(51.47, -0.4543);
        let cdg = GeoPoint::new(49.0097, 2.5479);
        let d = distance_nm(lhr, cdg);
        assert!((185.0..200.0).contains(&d), "got {d}");
    }

    #[test]
    fn lerp_clamps_and_bearing_handles_identical_points() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(10.0, 10.0);
        assert_eq!(lerp(a, b, 2.0), b);
        assert_eq!(lerp(a, b, 0.5), GeoPoint::new(5.0, 5.0));
        assert!(bearing(a, a).is_none());
        let north = bearing(a, GeoPoint::new(1.0, 0.0)).unwrap();
        assert!(north.abs() < 1e-9);
    }
}
