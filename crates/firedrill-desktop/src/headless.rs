//! Windowless run of the composition model
//!
//! Drives the scene with a fixed-step clock and an optional scripted click.
//! Nothing is drawn; the surface only counts frames.

use std::fmt;

use firedrill_core::{
    run_render_loop, FireState, FixedStepClock, FrameTime, NoXr, Notification, RenderSurface,
    SceneComposer, SceneConfig, SceneContext, Viewport, XrStatus,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct HeadlessOptions {
    pub frames: u64,
    pub frame_ms: f64,
    /// Frame index at which the extinguisher is clicked
    pub pick_at: Option<u64>,
}

/// Counts frames instead of drawing them
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    frames: u64,
    viewport: Viewport,
}

impl RenderSurface for HeadlessSurface {
    fn render(&mut self, frame: &FrameTime, ctx: &SceneContext) {
        self.frames += 1;
        if frame.index % 60 == 0 {
            let particles: usize = ctx.emitters().iter().map(|b| b.emitter.particles().len()).sum();
            debug!(frame = frame.index, elapsed_ms = frame.elapsed_ms, particles, "Frame");
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

/// What a headless run ended with
#[derive(Debug, Clone)]
pub struct HeadlessReport {
    pub scene: String,
    pub frames: u64,
    pub picks: u32,
    pub fire_state: Option<FireState>,
    pub label: Option<String>,
    pub notices: Vec<Notification>,
    pub xr: XrStatus,
}

impl fmt::Display for HeadlessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scene: {}", self.scene)?;
        writeln!(f, "  Frames: {}", self.frames)?;
        writeln!(f, "  Picks: {}", self.picks)?;
        match self.fire_state {
            Some(state) => writeln!(f, "  Fire: {:?}", state)?,
            None => writeln!(f, "  Fire: none")?,
        }
        if let Some(label) = &self.label {
            writeln!(f, "  Label: {}", label)?;
        }
        for notice in &self.notices {
            writeln!(f, "  Notice: {}", notice.message)?;
        }
        write!(f, "  XR: {:?}", self.xr)
    }
}

pub async fn run(config: &SceneConfig, options: HeadlessOptions) -> HeadlessReport {
    let mut ctx = SceneContext::new();
    let mut composer = SceneComposer::compose(config, &mut ctx);

    if let Some(xr) = &config.xr {
        composer.request_immersive_session(&mut ctx, &NoXr, xr).await;
    }

    let mut surface = HeadlessSurface::default();
    composer.handle_resize(&mut ctx, &mut surface, Viewport::default());

    let target = composer
        .extinguisher()
        .map(|ext| ext.parts().first().copied().unwrap_or(ext.root()));
    let mut notices = Vec::new();
    let mut clock = FixedStepClock::new(options.frame_ms, options.frames);

    let frames = run_render_loop(&mut ctx, &mut surface, &mut clock, |frame, ctx| {
        if options.pick_at == Some(frame.index) {
            if let Some(node) = target {
                composer.pick(ctx, node);
            }
        }
        notices.extend(ctx.drain_notifications());
    });

    let report = HeadlessReport {
        scene: config.name.clone(),
        frames,
        picks: composer.extinguisher().map(|e| e.pick_count()).unwrap_or(0),
        fire_state: composer.fire_state(),
        label: ctx.label.as_ref().map(|l| l.text.clone()),
        notices,
        xr: ctx.xr_status().clone(),
    };
    info!(frames, fire = ?report.fire_state, "Headless run finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use firedrill_core::feedback::{DEFAULT_CONFIRMATION, DEFAULT_PROMPT};
    use firedrill_core::{ScenePreset, XrError};

    fn options(pick_at: Option<u64>) -> HeadlessOptions {
        HeadlessOptions {
            frames: 120,
            frame_ms: 16.0,
            pick_at,
        }
    }

    #[tokio::test]
    async fn test_fire_stays_lit_without_a_click() {
        let report = run(&ScenePreset::Classroom.config(), options(None)).await;
        assert_eq!(report.frames, 120);
        assert_eq!(report.picks, 0);
        assert_eq!(report.fire_state, Some(FireState::Active));
        assert_eq!(report.label.as_deref(), Some(DEFAULT_PROMPT));
        assert_eq!(report.xr, XrStatus::NotRequested);
    }

    #[tokio::test]
    async fn test_scripted_click_puts_fire_out() {
        let report = run(&ScenePreset::Classroom.config(), options(Some(30))).await;
        assert_eq!(report.picks, 1);
        assert_eq!(report.fire_state, Some(FireState::Extinguished));
        assert_eq!(report.label.as_deref(), Some(DEFAULT_CONFIRMATION));
        assert!(report.notices.is_empty());
    }

    #[tokio::test]
    async fn test_xr_scene_falls_back_and_notifies() {
        let report = run(&ScenePreset::TrainingRoom.config(), options(Some(10))).await;
        assert_eq!(report.xr, XrStatus::Fallback(XrError::Unsupported));
        assert_eq!(report.frames, 120);
        assert_eq!(report.fire_state, Some(FireState::Extinguished));
        assert_eq!(report.notices.len(), 1);
        assert!(report.label.is_none());
    }
}
