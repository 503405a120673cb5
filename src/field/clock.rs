//! Frame-counted animation clock.

/// Unitless animation time, advanced by a fixed step once per frame.
///
/// There is no wall-clock compensation: a host that drops frames animates
/// proportionally slower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    time: f64,
    speed: f64,
}

impl AnimationClock {
    pub fn new(speed: f64) -> Self {
        Self { time: 0.0, speed }
    }

    /// Advance by one frame and return the new time.
    pub fn advance(&mut self) -> f64 {
        self.time += self.speed;
        self.time
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}
