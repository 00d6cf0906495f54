//! Fixed-rate frame loop with an explicit stop hook.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cloneable handle that ends a [`RenderLoop`]
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Work driven by a [`RenderLoop`]
pub trait FrameHandler {
    type Error;

    /// Called between frames with the time left until the next one; may
    /// block for up to `timeout` waiting for input.
    fn idle(&mut self, timeout: Duration) -> Result<(), Self::Error>;

    /// Called once per frame with the seconds since the previous frame
    fn frame(&mut self, dt: f64) -> Result<(), Self::Error>;
}

pub struct RenderLoop {
    interval: Duration,
    stop: StopHandle,
}

impl RenderLoop {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        RenderLoop {
            interval: Duration::from_secs_f64(1.0 / fps as f64),
            stop: StopHandle::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs frames until the stop handle fires or the handler fails
    pub fn run<H: FrameHandler>(&self, handler: &mut H) -> Result<(), H::Error> {
        let mut last_frame = Instant::now();
        let mut next_frame = last_frame;

        while !self.stop.is_stopped() {
            let now = Instant::now();
            if now < next_frame {
                handler.idle(next_frame - now)?;
                continue;
            }

            let dt = now.duration_since(last_frame).as_secs_f64();
            last_frame = now;
            handler.frame(dt)?;

            next_frame += self.interval;
            if next_frame < now {
                // Fell behind; skip the missed frames instead of bursting
                next_frame = now + self.interval;
            }
        }
        log::debug!("render loop stopped");
        Ok(())
    }
}

/// Frames-per-second counter refreshed once a second
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        FpsCounter {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn frame(&mut self) {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler {
        frames: usize,
        idles: usize,
        stop: StopHandle,
    }

    impl FrameHandler for CountingHandler {
        type Error = ();

        fn idle(&mut self, timeout: Duration) -> Result<(), ()> {
            self.idles += 1;
            std::thread::sleep(timeout);
            Ok(())
        }

        fn frame(&mut self, _dt: f64) -> Result<(), ()> {
            self.frames += 1;
            if self.frames == 3 {
                self.stop.stop();
            }
            Ok(())
        }
    }

    #[test]
    fn loop_runs_until_stopped() {
        let render_loop = RenderLoop::new(200);
        let mut handler = CountingHandler {
            frames: 0,
            idles: 0,
            stop: render_loop.stop_handle(),
        };
        render_loop.run(&mut handler).unwrap();
        assert_eq!(handler.frames, 3);
        assert!(handler.idles >= 2);
    }

    #[test]
    fn stopped_loop_never_renders() {
        let render_loop = RenderLoop::new(60);
        render_loop.stop_handle().stop();
        let mut handler = CountingHandler {
            frames: 0,
            idles: 0,
            stop: render_loop.stop_handle(),
        };
        render_loop.run(&mut handler).unwrap();
        assert_eq!(handler.frames, 0);
    }

    #[test]
    fn errors_end_the_loop() {
        struct Failing;
        impl FrameHandler for Failing {
            type Error = &'static str;
            fn idle(&mut self, _timeout: Duration) -> Result<(), Self::Error> {
                Ok(())
            }
            fn frame(&mut self, _dt: f64) -> Result<(), Self::Error> {
                Err("boom")
            }
        }
        assert_eq!(RenderLoop::new(60).run(&mut Failing), Err("boom"));
    }

    #[test]
    fn interval_matches_fps() {
        assert_eq!(RenderLoop::new(50).interval(), Duration::from_millis(20));
        assert_eq!(RenderLoop::new(0).interval(), Duration::from_secs(1));
    }
}
