use std::f64::consts::PI;

/// Raw progress below which the model does not turn
pub const DEAD_ZONE: f64 = 0.05;
/// Total rotation applied over the full scroll range
pub const FULL_TURN: f64 = 3.0 * PI;
/// Smallest rotation step worth applying
pub const MIN_STEP: f64 = 0.001;

/// Scroll-driven rotation about the vertical axis.
///
/// Tracks the last rotation actually applied so each update only turns the
/// model by the difference to the new target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollRotation {
    current: f64,
}

impl ScrollRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied cumulative rotation in radians
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Target rotation for a raw progress value, `None` inside the dead-zone
    pub fn target(progress: f64) -> Option<f64> {
        if progress.is_nan() || progress <= DEAD_ZONE {
            return None;
        }
        let normalized = (progress.min(1.0) - DEAD_ZONE) / (1.0 - DEAD_ZONE);
        Some(FULL_TURN * normalized)
    }

    /// Returns the rotation delta to apply for `progress`, if any.
    ///
    /// Nothing happens without a model, inside the dead-zone, or when the
    /// step is at most [`MIN_STEP`].
    pub fn update(&mut self, progress: f64, model_loaded: bool) -> Option<f64> {
        if !model_loaded {
            return None;
        }
        let target = Self::target(progress)?;
        let delta = target - self.current;
        if delta.abs() <= MIN_STEP {
            return None;
        }
        self.current = target;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_zone_never_rotates() {
        let mut rotation = ScrollRotation::new();
        for p in [0.0, 0.01, 0.049, DEAD_ZONE] {
            assert_eq!(rotation.update(p, true), None);
        }
        rotation.update(0.5, true);
        let before = rotation.current();
        assert_eq!(rotation.update(0.02, true), None);
        assert_eq!(rotation.current(), before);
    }

    #[test]
    fn no_model_no_rotation() {
        let mut rotation = ScrollRotation::new();
        assert_eq!(rotation.update(0.8, false), None);
        assert_eq!(rotation.current(), 0.0);
    }

    #[test]
    fn monotonic_progress_reaches_full_turn() {
        let mut rotation = ScrollRotation::new();
        let mut total = 0.0;
        let mut last = 0.0;
        for step in 0..=950 {
            let p = DEAD_ZONE + step as f64 * 0.001;
            if let Some(delta) = rotation.update(p.min(1.0), true) {
                assert!(delta > 0.0);
                total += delta;
            }
            assert!(rotation.current() >= last);
            last = rotation.current();
        }
        rotation.update(1.0, true);
        assert!((rotation.current() - FULL_TURN).abs() < 1e-9);
        assert!((total - rotation.current()).abs() < 1e-9);
    }

    #[test]
    fn tiny_steps_are_suppressed() {
        let mut rotation = ScrollRotation::new();
        rotation.update(0.5, true);
        let current = rotation.current();
        // 3π/0.95 * 0.0001 ≈ 0.00099 rad
        assert_eq!(rotation.update(0.5001, true), None);
        assert_eq!(rotation.current(), current);
        assert!(rotation.update(0.501, true).is_some());
    }

    #[test]
    fn single_jump_lands_on_full_turn() {
        let mut rotation = ScrollRotation::new();
        let delta = rotation.update(1.0, true).unwrap();
        let expected = FULL_TURN * (1.0 - DEAD_ZONE) / (1.0 - DEAD_ZONE);
        assert!((delta - expected).abs() < 1e-9);
        assert!((rotation.current() - FULL_TURN).abs() < 1e-9);
    }
}
