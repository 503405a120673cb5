//! Drawable viewport dimensions.

/// Current pixel size of the drawing surface.
///
/// Both dimensions are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportState {
    width: u32,
    height: u32,
}

impl ViewportState {
    /// Build a viewport from host-reported client dimensions, clamping
    /// zero or negative values to 1.
    pub fn from_client(width: i32, height: i32) -> Self {
        if width <= 0 || height <= 0 {
            log::debug!("Degenerate viewport {}x{}, clamping to at least 1x1", width, height);
        }
        Self {
            width: width.max(1) as u32,
            height: height.max(1) as u32,
        }
    }

    /// Overwrite with new client dimensions.
    ///
    /// Returns `true` when the stored size changed.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        let next = Self::from_client(width, height);
        let changed = next != *self;
        *self = next;
        changed
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn center_x(&self) -> f64 {
        self.width as f64 / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.height as f64 / 2.0
    }
}
