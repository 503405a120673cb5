//! Single-point perspective projection.

use super::viewport::ViewportState;

/// Virtual camera distance added to every depth before the divide.
pub const CAMERA_DISTANCE: f64 = 400.0;
/// Downward shift of the whole field, in pixels.
pub const VERTICAL_BIAS: f64 = 100.0;
/// Extra vertical stretch applied to wave offsets.
pub const VERTICAL_STRETCH: f64 = 2.0;

/// Perspective divide around a fixed focal distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveProjector {
    perspective: f64,
}

impl PerspectiveProjector {
    pub fn new(perspective: f64) -> Self {
        Self { perspective }
    }

    /// Shrink factor for a point at depth `z`. Farther points get smaller.
    #[inline]
    pub fn scale(&self, z: f64) -> f64 {
        self.perspective / (self.perspective + z + CAMERA_DISTANCE)
    }

    /// Project a sample onto the screen, returning `(x2d, y2d)`.
    #[inline]
    pub fn project(&self, x: f64, y_offset: f64, scale: f64, viewport: &ViewportState) -> (f64, f64) {
        let x2d = viewport.center_x() + x * scale;
        let y2d = viewport.center_y() + VERTICAL_BIAS + y_offset * scale * VERTICAL_STRETCH;
        (x2d, y2d)
    }

    pub fn perspective(&self) -> f64 {
        self.perspective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_at_origin() {
        let projector = PerspectiveProjector::new(300.0);
        assert!((projector.scale(0.0) - 300.0 / 700.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_shrinks_with_depth() {
        let projector = PerspectiveProjector::new(300.0);
        assert!(projector.scale(40.0) < projector.scale(0.0));
        assert!(projector.scale(1600.0) < projector.scale(40.0));
    }

    #[test]
    fn test_scale_positive_over_depth_window() {
        let projector = PerspectiveProjector::new(300.0);
        let (gap, lines) = (40.0, 40.0);
        let mut z = -gap;
        while z <= lines * gap {
            let scale = projector.scale(z);
            assert!(scale > 0.0 && scale.is_finite(), "scale({z}) = {scale}");
            z += 0.5;
        }
    }

    #[test]
    fn test_project_center_sample() {
        let projector = PerspectiveProjector::new(300.0);
        let viewport = ViewportState::from_client(800, 600);
        let (x2d, y2d) = projector.project(0.0, 0.0, 0.5, &viewport);
        assert_eq!(x2d, 400.0);
        assert_eq!(y2d, 400.0);
    }
}
