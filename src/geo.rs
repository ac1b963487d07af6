//! Great-circle distance on a spherical Earth.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance between two points in kilometers, using the
/// haversine formula.
///
/// Coordinates are degrees and are not range-checked: out-of-range or
/// non-finite inputs yield a mathematically defined but physically
/// meaningless result rather than an error.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Total length of an ordered point sequence in kilometers, summing the
/// haversine distance between consecutive points. Empty and single-point
/// inputs yield 0.0.
pub fn path_distance_km(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}
