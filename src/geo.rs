//! Geographic value types and spherical math.
//!
//! All angles are degrees, bearings are compass bearings (0 = north,
//! clockwise) and distances are meters unless a function name says otherwise.

use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Mean earth radius in meters
pub const EARTH_RADIUS_METER: f64 = 6_371_000.0;

/// Meters per nautical mile
pub const METER_PER_NM: f64 = 1852.0;

#[inline(always)]
pub fn nm_to_meter(nm: f64) -> f64 {
    nm * METER_PER_NM
}

#[inline(always)]
pub fn meter_to_nm(meter: f64) -> f64 {
    meter / METER_PER_NM
}

/// Normalize a bearing into [0, 360)
#[inline(always)]
pub fn normalize_course(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Normalize longitude into [-180, 180)
#[inline(always)]
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// A geographic position with optional altitude (feet).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, alt: None }
    }

    pub const fn with_alt(lon: f64, lat: f64, alt: f64) -> Self {
        Self {
            lon,
            lat,
            alt: Some(alt),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Same horizontal position within `epsilon` degrees
    pub fn almost_equal(&self, other: &GeoPoint, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() < epsilon
            && (normalize_lon(self.lon - other.lon)).abs() < epsilon
    }

    /// Unit sphere vector
    #[inline(always)]
    pub fn to_vec3(&self) -> DVec3 {
        lonlat_to_vec3(self.lon, self.lat)
    }

    #[inline(always)]
    pub fn from_vec3(p: DVec3) -> GeoPoint {
        let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = p.y.atan2(p.x).to_degrees();
        GeoPoint::new(lon, lat)
    }

    /// Central angle to `other` in radians (haversine)
    pub fn angular_distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        2.0 * a.sqrt().min(1.0).asin()
    }

    /// Great circle distance in meters
    pub fn distance_meter_to(&self, other: &GeoPoint) -> f64 {
        self.angular_distance_to(other) * EARTH_RADIUS_METER
    }

    /// Initial great circle bearing to `other` in [0, 360)
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let x = delta_lon.sin() * lat2.cos();
        let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

        normalize_course(x.atan2(y).to_degrees())
    }

    /// Destination after flying `distance_meter` on the great circle starting at `bearing`
    pub fn endpoint(&self, distance_meter: f64, bearing: f64) -> GeoPoint {
        let delta = distance_meter / EARTH_RADIUS_METER;
        let theta = bearing.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(normalize_lon(lon2.to_degrees()), lat2.to_degrees())
    }

    /// Point at `fraction` of the great circle to `other`.
    /// `distance_meter` is the precomputed distance between both points.
    pub fn interpolate(&self, other: &GeoPoint, distance_meter: f64, fraction: f64) -> GeoPoint {
        if fraction <= 0.0 {
            return *self;
        }
        if fraction >= 1.0 {
            return *other;
        }

        let angle = distance_meter / EARTH_RADIUS_METER;
        let sin_angle = angle.sin();
        if sin_angle.abs() < 1e-12 {
            return *self;
        }

        let a = self.to_vec3();
        let b = other.to_vec3();
        let sa = ((1.0 - fraction) * angle).sin() / sin_angle;
        let sb = (fraction * angle).sin() / sin_angle;
        GeoPoint::from_vec3(a * sa + b * sb)
    }

    /// Rhumb line distance in meters
    pub fn distance_meter_rhumb_to(&self, other: &GeoPoint) -> f64 {
        let (delta_lat, delta_lon, q) = rhumb_deltas(self, other);
        (delta_lat * delta_lat + q * q * delta_lon * delta_lon).sqrt() * EARTH_RADIUS_METER
    }

    /// Constant rhumb line bearing to `other` in [0, 360)
    pub fn bearing_rhumb_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let mut delta_lon = (other.lon - self.lon).to_radians();
        if delta_lon.abs() > PI {
            delta_lon -= delta_lon.signum() * 2.0 * PI;
        }
        let delta_psi = ((FRAC_PI_4 + lat2 / 2.0).tan() / (FRAC_PI_4 + lat1 / 2.0).tan()).ln();
        normalize_course(delta_lon.atan2(delta_psi).to_degrees())
    }

    /// Destination on a rhumb line
    pub fn endpoint_rhumb(&self, distance_meter: f64, bearing: f64) -> GeoPoint {
        let delta = distance_meter / EARTH_RADIUS_METER;
        let theta = bearing.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let delta_lat = delta * theta.cos();
        let mut lat2 = lat1 + delta_lat;
        if lat2.abs() > FRAC_PI_2 {
            lat2 = if lat2 > 0.0 { PI - lat2 } else { -PI - lat2 };
        }

        let delta_psi = ((FRAC_PI_4 + lat2 / 2.0).tan() / (FRAC_PI_4 + lat1 / 2.0).tan()).ln();
        let q = if delta_psi.abs() > 1e-12 {
            delta_lat / delta_psi
        } else {
            lat1.cos()
        };
        let delta_lon = delta * theta.sin() / q;

        GeoPoint::new(
            normalize_lon((lon1 + delta_lon).to_degrees()),
            lat2.to_degrees(),
        )
    }

    /// Point at `fraction` of the rhumb line to `other`
    pub fn interpolate_rhumb(&self, other: &GeoPoint, distance_meter: f64, fraction: f64) -> GeoPoint {
        if fraction <= 0.0 {
            return *self;
        }
        if fraction >= 1.0 {
            return *other;
        }
        self.endpoint_rhumb(distance_meter * fraction, self.bearing_rhumb_to(other))
    }
}

/// Returns (delta lat rad, delta lon rad along the shorter side, q stretch factor)
fn rhumb_deltas(from: &GeoPoint, to: &GeoPoint) -> (f64, f64, f64) {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = lat2 - lat1;
    let mut delta_lon = (to.lon - from.lon).to_radians();
    if delta_lon.abs() > PI {
        delta_lon -= delta_lon.signum() * 2.0 * PI;
    }

    let delta_psi = ((FRAC_PI_4 + lat2 / 2.0).tan() / (FRAC_PI_4 + lat1 / 2.0).tan()).ln();
    let q = if delta_psi.abs() > 1e-12 {
        delta_lat / delta_psi
    } else {
        lat1.cos()
    };
    (delta_lat, delta_lon, q)
}

/// Geographic bounding rectangle. `west > east` means it crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRect {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

impl GeoRect {
    pub const WORLD: GeoRect = GeoRect {
        west: -180.0,
        north: 90.0,
        east: 180.0,
        south: -90.0,
    };

    pub fn new(west: f64, north: f64, east: f64, south: f64) -> Self {
        Self {
            west,
            north,
            east,
            south,
        }
    }

    /// Bounding rectangle of a point sequence (no antimeridian handling)
    pub fn bounding(points: &[GeoPoint]) -> Option<GeoRect> {
        let first = points.first()?;
        let mut rect = GeoRect::new(first.lon, first.lat, first.lon, first.lat);
        for p in &points[1..] {
            rect.west = rect.west.min(p.lon);
            rect.east = rect.east.max(p.lon);
            rect.north = rect.north.max(p.lat);
            rect.south = rect.south.min(p.lat);
        }
        Some(rect)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    pub fn contains(&self, p: &GeoPoint) -> bool {
        if p.lat > self.north || p.lat < self.south {
            return false;
        }
        if self.crosses_antimeridian() {
            p.lon >= self.west || p.lon <= self.east
        } else {
            p.lon >= self.west && p.lon <= self.east
        }
    }

    pub fn overlaps(&self, other: &GeoRect) -> bool {
        if other.south > self.north || other.north < self.south {
            return false;
        }
        let spans = |r: &GeoRect| -> Vec<(f64, f64)> {
            if r.crosses_antimeridian() {
                vec![(r.west, 180.0), (-180.0, r.east)]
            } else {
                vec![(r.west, r.east)]
            }
        };
        spans(self).iter().any(|&(w1, e1)| {
            spans(other)
                .iter()
                .any(|&(w2, e2)| w2 <= e1 && e2 >= w1)
        })
    }
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
pub fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// Interpolate along a great circle arc and call a visitor for each subdivision point.
/// Subdivides into ~2° segments and always ends with the exact end point.
/// Does not emit the start point.
#[inline]
pub fn walk_great_circle(from: GeoPoint, to: GeoPoint, mut visitor: impl FnMut(GeoPoint)) {
    let a = from.to_vec3();
    let b = to.to_vec3();

    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos();

    // Exact multiples of 2° must not gain a step from rounding noise
    let steps = ((angle.to_degrees() / 2.0 - 1e-9).ceil() as usize).max(1);
    let sin_angle = angle.sin();

    // Short, identical or antipodal
    if steps == 1 || sin_angle.abs() < 1e-10 {
        visitor(to);
        return;
    }

    for i in 1..steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        visitor(GeoPoint::from_vec3(a * sa + b * sb));
    }
    visitor(to);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_one_degree_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let nm = meter_to_nm(a.distance_meter_to(&b));
        assert!((nm - 60.04).abs() < 0.1, "got {nm}");
    }

    #[test]
    fn test_bearing_cardinal() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((origin.bearing_to(&GeoPoint::new(0.0, 1.0)) - 0.0).abs() < 1e-9);
        assert!((origin.bearing_to(&GeoPoint::new(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((origin.bearing_to(&GeoPoint::new(-1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_endpoint_matches_distance_and_bearing() {
        let start = GeoPoint::new(8.5, 47.4);
        let end = start.endpoint(nm_to_meter(25.0), 135.0);
        assert!((meter_to_nm(start.distance_meter_to(&end)) - 25.0).abs() < 1e-6);
        assert!((start.bearing_to(&end) - 135.0).abs() < 1e-6);
    }

    #[test]
    fn test_interpolate_midpoint_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(2.0, 0.0);
        let mid = a.interpolate(&b, a.distance_meter_to(&b), 0.5);
        assert!((mid.lon - 1.0).abs() < 1e-9);
        assert!(mid.lat.abs() < 1e-9);
    }

    #[test]
    fn test_rhumb_bearing_constant() {
        let a = GeoPoint::new(-10.0, 40.0);
        let b = GeoPoint::new(10.0, 50.0);
        let dist = a.distance_meter_rhumb_to(&b);
        let brg = a.bearing_rhumb_to(&b);
        let mid = a.interpolate_rhumb(&b, dist, 0.5);
        assert!((mid.bearing_rhumb_to(&b) - brg).abs() < 1e-6);
        // Rhumb is never shorter than the great circle
        assert!(dist >= a.distance_meter_to(&b));
    }

    #[test]
    fn test_rect_antimeridian() {
        let rect = GeoRect::new(170.0, 10.0, -170.0, -10.0);
        assert!(rect.contains(&GeoPoint::new(179.0, 0.0)));
        assert!(rect.contains(&GeoPoint::new(-175.0, 0.0)));
        assert!(!rect.contains(&GeoPoint::new(0.0, 0.0)));
        assert!(rect.overlaps(&GeoRect::new(-175.0, 5.0, -160.0, -5.0)));
        assert!(!rect.overlaps(&GeoRect::new(0.0, 5.0, 10.0, -5.0)));
    }

    #[test]
    fn test_walk_great_circle_ends_at_target() {
        let mut points = Vec::new();
        walk_great_circle(GeoPoint::new(0.0, 0.0), GeoPoint::new(10.0, 0.0), |p| points.push(p));
        assert_eq!(points.len(), 5);
        assert_eq!(*points.last().unwrap(), GeoPoint::new(10.0, 0.0));

        for (lon, expected) in [(4.0, 2), (2.0, 1), (1.0, 1), (5.0, 3)] {
            let mut count = 0;
            walk_great_circle(GeoPoint::new(0.0, 0.0), GeoPoint::new(lon, 0.0), |_| count += 1);
            assert_eq!(count, expected, "{lon}° arc");
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(GeoPoint::new(180.0, -90.0).is_valid());
        assert!(!GeoPoint::new(0.0, 95.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert_eq!(GeoPoint::with_alt(1.0, 2.0, 3500.0).alt, Some(3500.0));
    }
}
