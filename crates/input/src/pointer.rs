use aurum_common::{ConfigError, FieldConfig, Smoothing, Viewport};
use glam::Vec2;

/// Latest raw pointer offset and its smoothed follower.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Offset from the viewport center, scaled. Written by pointer events.
    pub raw: Vec2,
    /// Converges toward `raw` once per tick.
    pub smoothed: Vec2,
}

/// Converts pointer events into a smoothed 2D offset.
///
/// Before any pointer event both offsets stay at zero.
#[derive(Debug, Clone)]
pub struct InputTracker {
    state: PointerState,
    smoothing: Smoothing,
    scale: f32,
}

impl InputTracker {
    /// `scale` converts logical pixels away from the viewport center into
    /// offset units.
    pub fn new(smoothing: Smoothing, scale: f32) -> Self {
        Self {
            state: PointerState::default(),
            smoothing,
            scale,
        }
    }

    pub fn from_config(config: &FieldConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.pointer_smoothing()?, config.pointer_scale))
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn raw(&self) -> Vec2 {
        self.state.raw
    }

    pub fn smoothed(&self) -> Vec2 {
        self.state.smoothed
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    /// Record a pointer position given in logical pixels relative to the
    /// viewport's top-left corner. Non-finite positions and invalid viewports
    /// are ignored.
    pub fn pointer_moved(&mut self, x: f32, y: f32, viewport: &Viewport) {
        let position = Vec2::new(x, y);
        if !position.is_finite() || !viewport.is_valid() {
            tracing::trace!(x, y, "ignoring pointer event");
            return;
        }
        self.state.raw = (position - viewport.center()) * self.scale;
    }

    /// Advance the smoothed offset one step toward the raw offset and return it.
    pub fn smooth(&mut self) -> Vec2 {
        self.state.smoothed = self.smoothing.approach(self.state.smoothed, self.state.raw);
        self.state.smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(k: f32) -> InputTracker {
        InputTracker::new(Smoothing::new(k).unwrap(), 0.001)
    }

    #[test]
    fn starts_at_rest() {
        let mut input = tracker(0.05);
        assert_eq!(input.state(), PointerState::default());
        assert_eq!(input.smooth(), Vec2::ZERO);
    }

    #[test]
    fn raw_is_centered_and_scaled() {
        let mut input = tracker(0.05);
        let viewport = Viewport::new(1000.0, 800.0, 2.0);
        input.pointer_moved(1000.0, 0.0, &viewport);
        assert!((input.raw() - Vec2::new(0.5, -0.4)).length() < 1e-6);
        input.pointer_moved(500.0, 400.0, &viewport);
        assert_eq!(input.raw(), Vec2::ZERO);
    }

    #[test]
    fn pointer_events_do_not_touch_smoothed() {
        let mut input = tracker(0.05);
        input.pointer_moved(0.0, 0.0, &Viewport::new(100.0, 100.0, 1.0));
        assert_eq!(input.smoothed(), Vec2::ZERO);
        assert_ne!(input.raw(), Vec2::ZERO);
    }

    #[test]
    fn invalid_events_are_ignored() {
        let mut input = tracker(0.05);
        input.pointer_moved(f32::NAN, 3.0, &Viewport::new(100.0, 100.0, 1.0));
        input.pointer_moved(3.0, 3.0, &Viewport::new(0.0, 100.0, 1.0));
        assert_eq!(input.raw(), Vec2::ZERO);
    }

    #[test]
    fn smoothed_converges_monotonically_without_overshoot() {
        for &k in &[0.01f32, 0.05, 0.5, 0.99] {
            let mut input = tracker(k);
            input.pointer_moved(900.0, 50.0, &Viewport::new(1000.0, 1000.0, 1.0));
            let target = input.raw();
            let mut previous = input.smoothed().distance(target);
            for _ in 0..500 {
                let s = input.smooth();
                let distance = s.distance(target);
                assert!(distance <= previous, "k={k} moved away from target");
                assert!(s.x <= target.x && s.y >= target.y, "k={k} overshot");
                previous = distance;
            }
            assert!(previous < 0.01);
        }
    }

    #[test]
    fn single_step_matches_formula() {
        let mut input = tracker(0.05);
        input.pointer_moved(200.0, 100.0, &Viewport::new(100.0, 100.0, 1.0));
        let raw = input.raw();
        let s = input.smooth();
        assert!((s - raw * 0.05).length() < 1e-7);
    }
}
