use glam::DVec2;
use std::f64::consts::PI;

use crate::geo::{GeoPoint, GeoRect, EARTH_RADIUS_METER};
use crate::map::convert::{CoordinateConverter, ScaleProvider, ScreenPoint, ScreenRect};

/// Web Mercator latitude limit
const MAX_LATITUDE: f64 = 85.0511287798;

/// Viewport representing the visible chart area and zoom level
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width.max(1) as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5;

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(2000.0);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(0.5);
    }

    /// Zoom by factor towards a specific pixel location
    pub fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let Some(target) = self.unproject(DVec2::new(px as f64, py as f64)) else {
            return;
        };

        self.zoom = (self.zoom * factor).clamp(0.5, 2000.0);

        // Pan so the same position stays under the cursor
        if let Some(now) = self.project(&target) {
            self.pan((now.x - px as f64) as i32, (now.y - py as f64) as i32);
        }
    }

    /// Zoom so that the visible width covers `km` kilometers at the center latitude
    pub fn zoom_to_distance(&mut self, km: f64) {
        if !(km > 0.0) {
            return;
        }
        let circumference_km = 2.0 * PI * EARTH_RADIUS_METER / 1000.0;
        let zoom = circumference_km * self.center_lat.to_radians().cos() / km;
        self.zoom = zoom.clamp(0.5, 2000.0);
    }

    /// World width in pixels at the current zoom
    fn world_pixels(&self) -> f64 {
        self.zoom * self.width.max(1) as f64
    }

    fn center_normalized(&self) -> DVec2 {
        mercator_normalized(self.center_lon, self.center_lat)
    }

    /// Visible ground width in kilometers, used to pick the detail layer
    pub fn distance_km(&self) -> f64 {
        self.meter_per_pixel() * self.width as f64 / 1000.0
    }

    /// Geographic bounds of the visible area, used for culling
    pub fn visible_bounds(&self) -> GeoRect {
        let top_left = self.unproject(DVec2::ZERO);
        let bottom_right = self.unproject(DVec2::new(self.width as f64, self.height as f64));
        match (top_left, bottom_right) {
            (Some(tl), Some(br)) if self.world_pixels() > self.width as f64 => {
                GeoRect::new(
                    crate::geo::normalize_lon(tl.lon),
                    tl.lat,
                    crate::geo::normalize_lon(br.lon),
                    br.lat,
                )
            }
            _ => GeoRect::WORLD,
        }
    }
}

/// Web Mercator normalized coordinates in [0, 1]
#[inline(always)]
fn mercator_normalized(lon: f64, lat: f64) -> DVec2 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    DVec2::new(x, y)
}

impl CoordinateConverter for Viewport {
    fn project(&self, pos: &GeoPoint) -> Option<ScreenPoint> {
        if !pos.lon.is_finite() || !pos.lat.is_finite() {
            return None;
        }

        let n = mercator_normalized(pos.lon, pos.lat);
        let mut dx = n.x - self.center_normalized().x;
        // Take the shorter way around the world
        if dx > 0.5 {
            dx -= 1.0;
        } else if dx < -0.5 {
            dx += 1.0;
        }
        let dy = n.y - self.center_normalized().y;

        let scale = self.world_pixels();
        Some(DVec2::new(
            dx * scale + self.width as f64 / 2.0,
            dy * scale + self.height as f64 / 2.0,
        ))
    }

    fn unproject(&self, point: ScreenPoint) -> Option<GeoPoint> {
        let scale = self.world_pixels();
        let center = self.center_normalized();

        let x = (point.x - self.width as f64 / 2.0) / scale + center.x;
        let y = (point.y - self.height as f64 / 2.0) / scale + center.y;

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

        lon.is_finite()
            .then(|| GeoPoint::new(crate::geo::normalize_lon(lon), lat))
    }

    fn screen_rect(&self) -> ScreenRect {
        ScreenRect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }
}

impl ScaleProvider for Viewport {
    /// Mercator scale at the center latitude
    fn meter_per_pixel(&self) -> f64 {
        let equator = 2.0 * PI * EARTH_RADIUS_METER / self.world_pixels();
        equator * self.center_lat.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let p = vp.project(&GeoPoint::new(0.0, 0.0)).unwrap();
        assert!((p.x - 50.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_round_trip_inside_viewport() {
        let vp = Viewport::new(8.0, 47.0, 200.0, 400, 300);
        for &(lon, lat) in &[(8.0, 47.0), (8.1, 47.05), (7.95, 46.98)] {
            let pos = GeoPoint::new(lon, lat);
            let screen = vp.project(&pos).unwrap();
            assert!(vp.is_visible(screen));
            let back = vp.unproject(screen).unwrap();
            assert!(back.almost_equal(&pos, 1e-9), "{pos:?} -> {back:?}");
        }
    }

    #[test]
    fn test_scale_halves_when_zooming_in_twice() {
        let mut vp = Viewport::new(0.0, 0.0, 10.0, 200, 200);
        let before = vp.meter_per_pixel();
        vp.zoom *= 2.0;
        assert!((vp.meter_per_pixel() * 2.0 - before).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_to_distance() {
        let mut vp = Viewport::new(8.5, 47.0, 1.0, 640, 480);
        vp.zoom_to_distance(150.0);
        assert!((vp.distance_km() - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_visible_bounds_contains_center() {
        let vp = Viewport::new(-122.0, 37.0, 50.0, 200, 100);
        let bounds = vp.visible_bounds();
        assert!(bounds.contains(&GeoPoint::new(-122.0, 37.0)));
        assert!(!bounds.contains(&GeoPoint::new(0.0, 0.0)));
    }
}
