//! Scroll-position bookkeeping: viewport, pinned section layout and scrub
//! smoothing.

use crate::timeline::Ease;

/// Visible area in CSS px with the device pixel ratio of the output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Viewport {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Number of viewport heights a section stays pinned for
pub const PIN_VIEWPORTS: f64 = 2.0;
/// Seconds the scrubbed playhead takes to catch up with the scroll position
pub const SCRUB_SECONDS: f64 = 1.0;

/// Scroll range over which a section's timeline runs.
///
/// The range starts when the section's top reaches the viewport top and
/// lasts `distance` px; the section is pinned for that whole range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrigger {
    pub distance: f64,
    pub pin: bool,
}

impl ScrollTrigger {
    /// Trigger pinned for two viewport heights, measured once at creation
    pub fn pinned(viewport: &Viewport) -> Self {
        ScrollTrigger {
            distance: viewport.height * PIN_VIEWPORTS,
            pin: true,
        }
    }

    /// Raw progress in [0, 1] for a scroll offset relative to the trigger start
    pub fn progress(&self, offset: f64) -> f64 {
        if self.distance <= 0.0 {
            return if offset >= 0.0 { 1.0 } else { 0.0 };
        }
        (offset / self.distance).clamp(0.0, 1.0)
    }
}

/// Smoothed playhead that follows the raw scroll progress.
///
/// Every new target starts an expo-out tween from the current playhead that
/// lands on the target after [`SCRUB_SECONDS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrub {
    seconds: f64,
    from: f64,
    elapsed: f64,
    current: f64,
    target: f64,
}

impl Scrub {
    pub fn new(seconds: f64) -> Self {
        Scrub {
            seconds,
            from: 0.0,
            elapsed: 0.0,
            current: 0.0,
            target: 0.0,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }
        self.from = self.current;
        self.elapsed = 0.0;
        self.target = target;
    }

    /// Moves the playhead straight to the target
    pub fn settle(&mut self) {
        self.current = self.target;
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Advances by `dt` seconds; returns whether the playhead moved
    pub fn advance(&mut self, dt: f64) -> bool {
        if self.current == self.target {
            return false;
        }
        self.elapsed += dt.max(0.0);
        // Tolerance absorbs the rounding of summed frame times
        if self.seconds <= 0.0 || self.elapsed >= self.seconds - 1e-9 {
            self.current = self.target;
            return true;
        }
        let eased = Ease::ExpoOut.apply(self.elapsed / self.seconds);
        self.current = self.from + (self.target - self.from) * eased;
        true
    }
}

/// A section currently intersecting the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleSection {
    pub index: usize,
    /// Offset of the section's top edge from the viewport top, in CSS px
    pub top: f64,
}

/// Vertical layout of pinned, viewport-tall sections
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    viewport_height: f64,
    triggers: Vec<ScrollTrigger>,
}

impl Page {
    pub fn new(viewport_height: f64, triggers: Vec<ScrollTrigger>) -> Self {
        Page {
            viewport_height,
            triggers,
        }
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    fn pin_distance(&self, index: usize) -> f64 {
        let trigger = &self.triggers[index];
        if trigger.pin {
            trigger.distance
        } else {
            0.0
        }
    }

    /// Scroll offset at which section `index` reaches the viewport top
    pub fn start(&self, index: usize) -> f64 {
        (0..index)
            .map(|i| self.viewport_height + self.pin_distance(i))
            .sum()
    }

    /// Raw progress of section `index` at scroll offset `scroll_y`
    pub fn progress(&self, index: usize, scroll_y: f64) -> f64 {
        self.triggers[index].progress(scroll_y - self.start(index))
    }

    /// Largest useful scroll offset: the last section's pin range ends with
    /// it filling the viewport
    pub fn max_scroll(&self) -> f64 {
        match self.triggers.len() {
            0 => 0.0,
            n => self.start(n - 1) + self.pin_distance(n - 1),
        }
    }

    /// Sections intersecting the viewport at `scroll_y`
    pub fn visible(&self, scroll_y: f64) -> Vec<VisibleSection> {
        (0..self.triggers.len())
            .filter_map(|index| {
                let start = self.start(index);
                let pin = self.pin_distance(index);
                let top = if scroll_y < start {
                    start - scroll_y
                } else if scroll_y <= start + pin {
                    0.0
                } else {
                    start + pin - scroll_y
                };
                let visible = top < self.viewport_height && top + self.viewport_height > 0.0;
                visible.then_some(VisibleSection { index, top })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(sections: usize) -> Page {
        let viewport = Viewport::new(800.0, 600.0, 1.0);
        Page::new(600.0, vec![ScrollTrigger::pinned(&viewport); sections])
    }

    #[test]
    fn trigger_spans_two_viewports() {
        let trigger = ScrollTrigger::pinned(&Viewport::new(800.0, 600.0, 1.0));
        assert_eq!(trigger.distance, 1200.0);
        assert_eq!(trigger.progress(-10.0), 0.0);
        assert_eq!(trigger.progress(600.0), 0.5);
        assert_eq!(trigger.progress(5000.0), 1.0);
    }

    #[test]
    fn sections_start_after_previous_pin() {
        let page = page(3);
        assert_eq!(page.start(0), 0.0);
        assert_eq!(page.start(1), 1800.0);
        assert_eq!(page.start(2), 3600.0);
        assert_eq!(page.max_scroll(), 4800.0);
        assert_eq!(page.progress(1, 2400.0), 0.5);
        assert_eq!(page.progress(1, 0.0), 0.0);
        assert_eq!(page.progress(0, 2400.0), 1.0);
    }

    #[test]
    fn pinned_section_fills_viewport() {
        let page = page(2);
        assert_eq!(page.visible(600.0), vec![VisibleSection { index: 0, top: 0.0 }]);
    }

    #[test]
    fn sections_scroll_past_each_other_after_pin() {
        let page = page(2);
        let visible = page.visible(1500.0);
        assert_eq!(
            visible,
            vec![
                VisibleSection { index: 0, top: -300.0 },
                VisibleSection { index: 1, top: 300.0 },
            ]
        );
    }

    #[test]
    fn scrub_lands_on_target_after_one_second() {
        let mut scrub = Scrub::new(SCRUB_SECONDS);
        scrub.set_target(1.0);
        let mut last = 0.0;
        for _ in 0..59 {
            assert!(scrub.advance(1.0 / 60.0));
            assert!(scrub.current() > last && scrub.current() < 1.0);
            last = scrub.current();
        }
        assert!(scrub.advance(1.0 / 60.0));
        assert_eq!(scrub.current(), 1.0);
        assert!(!scrub.advance(1.0 / 60.0));
    }

    #[test]
    fn retargeting_restarts_from_current_playhead() {
        let mut scrub = Scrub::new(SCRUB_SECONDS);
        scrub.set_target(1.0);
        scrub.advance(0.1);
        let midway = scrub.current();
        assert!((midway - 0.5).abs() < 1e-9);

        scrub.set_target(0.0);
        scrub.advance(0.5);
        assert!(scrub.current() < midway && scrub.current() > 0.0);
        scrub.advance(0.5);
        assert_eq!(scrub.current(), 0.0);
    }

    #[test]
    fn settle_jumps_to_target() {
        let mut scrub = Scrub::new(SCRUB_SECONDS);
        scrub.set_target(0.3);
        scrub.settle();
        assert_eq!(scrub.current(), 0.3);
        assert!(!scrub.advance(0.1));
    }
}
