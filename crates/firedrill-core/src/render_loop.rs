//! Redraw driver
//!
//! Each frame runs the context's ticks and emitters, then hands the context
//! to the surface to draw. The clock decides when frames happen and when the
//! loop ends; in a browser or a window that is the host going away.

use tracing::debug;

use crate::context::{FrameTime, SceneContext, Viewport};

/// Something that can present a scene
pub trait RenderSurface {
    fn render(&mut self, frame: &FrameTime, ctx: &SceneContext);

    /// Recompute the output size
    fn resize(&mut self, viewport: Viewport);
}

/// Source of frame timestamps
pub trait FrameClock {
    /// Milliseconds since the loop started, or `None` once the host is gone
    fn next_frame(&mut self) -> Option<f64>;
}

/// Clock that produces a fixed number of evenly spaced frames
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step_ms: f64,
    remaining: u64,
    next_ms: f64,
}

impl FixedStepClock {
    pub fn new(step_ms: f64, frames: u64) -> Self {
        Self {
            step_ms,
            remaining: frames,
            next_ms: 0.0,
        }
    }
}

impl FrameClock for FixedStepClock {
    fn next_frame(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let now = self.next_ms;
        self.next_ms += self.step_ms;
        Some(now)
    }
}

/// Update the scene for `elapsed_ms` and draw it
pub fn render_frame(
    ctx: &mut SceneContext,
    surface: &mut dyn RenderSurface,
    elapsed_ms: f64,
) -> FrameTime {
    let frame = ctx.advance(elapsed_ms);
    surface.render(&frame, ctx);
    frame
}

/// Render until the clock runs out; returns the number of frames drawn
///
/// `after_frame` runs once per frame after drawing. Hosts use it to feed
/// input (picks, resizes) that arrived during the frame.
pub fn run_render_loop<C, F>(
    ctx: &mut SceneContext,
    surface: &mut dyn RenderSurface,
    clock: &mut C,
    mut after_frame: F,
) -> u64
where
    C: FrameClock + ?Sized,
    F: FnMut(&FrameTime, &mut SceneContext),
{
    let mut frames = 0;
    while let Some(elapsed_ms) = clock.next_frame() {
        let frame = render_frame(ctx, surface, elapsed_ms);
        after_frame(&frame, ctx);
        frames += 1;
    }
    debug!(frames, "Render loop ended");
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSurface {
        elapsed: Vec<f64>,
    }

    impl RenderSurface for CountingSurface {
        fn render(&mut self, frame: &FrameTime, _ctx: &SceneContext) {
            self.elapsed.push(frame.elapsed_ms);
        }

        fn resize(&mut self, _viewport: Viewport) {}
    }

    #[test]
    fn test_fixed_step_clock() {
        let mut clock = FixedStepClock::new(16.0, 3);
        assert_eq!(clock.next_frame(), Some(0.0));
        assert_eq!(clock.next_frame(), Some(16.0));
        assert_eq!(clock.next_frame(), Some(32.0));
        assert_eq!(clock.next_frame(), None);
    }

    #[test]
    fn test_loop_runs_ticks_before_render() {
        let mut ctx = SceneContext::new();
        let mut surface = CountingSurface::default();
        let mut seen = Vec::new();
        let frames = run_render_loop(
            &mut ctx,
            &mut surface,
            &mut FixedStepClock::new(10.0, 4),
            |frame, ctx| seen.push((frame.index, ctx.last_frame().map(|f| f.index))),
        );
        assert_eq!(frames, 4);
        assert_eq!(surface.elapsed, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(seen[3], (3, Some(3)));
    }

    #[test]
    fn test_empty_clock_draws_nothing() {
        let mut ctx = SceneContext::new();
        let mut surface = CountingSurface::default();
        let frames = run_render_loop(&mut ctx, &mut surface, &mut FixedStepClock::new(16.0, 0), |_, _| {});
        assert_eq!(frames, 0);
        assert!(ctx.last_frame().is_none());
    }
}
