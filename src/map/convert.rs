use glam::DVec2;

use crate::geo::{nm_to_meter, GeoPoint};

/// Screen position in pixels, y grows downwards
pub type ScreenPoint = DVec2;

/// Axis aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grow on all sides by `margin` pixels
    pub fn expanded(&self, margin: f64) -> ScreenRect {
        ScreenRect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Rough bounding box check for a segment
    pub fn segment_might_be_visible(&self, p1: ScreenPoint, p2: ScreenPoint) -> bool {
        let min = p1.min(p2);
        let max = p1.max(p2);
        max.x >= self.x && min.x <= self.right() && max.y >= self.y && min.y <= self.bottom()
    }
}

/// Geographic to screen projection of the map widget.
pub trait CoordinateConverter {
    /// Returns `None` if the position cannot be projected (hidden side of the globe,
    /// outside the projection domain). Off-screen positions are still returned.
    fn project(&self, pos: &GeoPoint) -> Option<ScreenPoint>;

    fn unproject(&self, point: ScreenPoint) -> Option<GeoPoint>;

    /// Visible drawing area
    fn screen_rect(&self) -> ScreenRect;

    fn is_visible(&self, point: ScreenPoint) -> bool {
        self.screen_rect().contains(point)
    }
}

/// Ground distance per screen pixel at the current zoom.
pub trait ScaleProvider {
    fn meter_per_pixel(&self) -> f64;

    fn pixel_for_meter(&self, meter: f64) -> f64 {
        let mpp = self.meter_per_pixel();
        if mpp > 0.0 {
            meter / mpp
        } else {
            0.0
        }
    }

    fn pixel_for_nm(&self, nm: f64) -> f64 {
        self.pixel_for_meter(nm_to_meter(nm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_visibility() {
        let rect = ScreenRect::new(0.0, 0.0, 100.0, 50.0);
        assert!(rect.segment_might_be_visible(DVec2::new(-10.0, 10.0), DVec2::new(10.0, 10.0)));
        assert!(!rect.segment_might_be_visible(DVec2::new(-10.0, 60.0), DVec2::new(200.0, 70.0)));
    }
}
