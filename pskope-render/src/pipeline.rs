//! Pipeline view - owns the surfaces and drives every renderer

use crate::color::stage_color;
use crate::focus::{FocusContextRenderer, FocusOutcome};
use crate::frame_loop::FrameLoop;
use crate::live_tap::LiveTapRenderer;
use crate::rasterizer::{draw, style_for};
use crate::surface::{DrawSurface, PixelSurface};
use pskope_playback::{AnalysisTap, MediaEventBus, PlaybackState, PlaybackSync, Subscription};
use pskope_signal::{SampleBuffer, Stage};
use std::fmt;
use std::str::FromStr;

/// Stage shown on the dynamic surface
pub const DYNAMIC_STAGE: Stage = Stage::Psk;

/// Which renderer owns the dynamic surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynamicMode {
    /// Context trace, focus window and playhead
    #[default]
    FocusContext,
    /// Instantaneous analysis tap window
    LiveTap,
}

impl DynamicMode {
    pub fn toggle(self) -> Self {
        match self {
            DynamicMode::FocusContext => DynamicMode::LiveTap,
            DynamicMode::LiveTap => DynamicMode::FocusContext,
        }
    }

    /// Config file name of the mode
    pub fn as_str(self) -> &'static str {
        match self {
            DynamicMode::FocusContext => "focus",
            DynamicMode::LiveTap => "live",
        }
    }
}

impl fmt::Display for DynamicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DynamicMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" | "context" => Ok(DynamicMode::FocusContext),
            "live" | "tap" => Ok(DynamicMode::LiveTap),
            other => Err(format!("unknown dynamic mode: {other}")),
        }
    }
}

/// Everything tied to one upload result
///
/// Dropping it releases both listeners on the media element it followed.
struct ActiveResults {
    buffer: SampleBuffer,
    generation: u64,
    sync: PlaybackSync,
    _frame_trigger: Subscription,
}

/// Six static stage surfaces plus the dynamic surface
pub struct PipelineView {
    stages: [PixelSurface; 6],
    dynamic: PixelSurface,
    mode: DynamicMode,
    focus: FocusContextRenderer,
    live: LiveTapRenderer,
    frame_loop: FrameLoop,
    active: Option<ActiveResults>,
    generation: u64,
}

impl PipelineView {
    pub fn new(mode: DynamicMode) -> Self {
        Self {
            stages: std::array::from_fn(|_| PixelSurface::stage()),
            dynamic: PixelSurface::dynamic(),
            mode,
            focus: FocusContextRenderer::new(),
            live: LiveTapRenderer::new(),
            frame_loop: FrameLoop::new(),
            active: None,
            generation: 0,
        }
    }

    /// Replace the displayed results and follow `bus` for playback
    pub fn set_results(&mut self, buffer: SampleBuffer, bus: &MediaEventBus) {
        // Old listeners go before anything is drawn for the new result
        self.active = None;
        self.frame_loop.stop();
        self.clear_surfaces();

        for (stage, samples) in buffer.iter() {
            let surface = &mut self.stages[stage.index()];
            let stats = draw(surface, samples, stage_color(stage), style_for(stage));
            tracing::debug!(%stage, len = samples.len(), points = stats.points, "stage drawn");
        }

        let mut sync = PlaybackSync::new();
        sync.attach(bus);

        let frame_loop = self.frame_loop.clone();
        let frame_trigger = bus.subscribe(move |event| {
            if event.starts_playback() {
                frame_loop.start();
            }
        });

        self.generation += 1;
        self.focus.reset();
        tracing::info!(
            generation = self.generation,
            source = buffer.source().unwrap_or("-"),
            "results replaced"
        );

        self.active = Some(ActiveResults {
            buffer,
            generation: self.generation,
            sync,
            _frame_trigger: frame_trigger,
        });

        self.refresh_dynamic();
    }

    /// Drop the active results and blank every surface
    pub fn clear_results(&mut self) {
        if self.active.take().is_some() {
            tracing::info!("results cleared");
        }
        self.frame_loop.stop();
        self.clear_surfaces();
    }

    /// One host frame; returns true if the dynamic surface was redrawn
    pub fn frame(&mut self, tap: Option<&mut AnalysisTap>) -> bool {
        let Some(active) = self.active.as_ref() else {
            self.frame_loop.stop();
            return false;
        };

        let state = active.sync.snapshot();
        if !self.frame_loop.tick(state.phase) {
            return false;
        }

        let color = stage_color(DYNAMIC_STAGE);
        match self.mode {
            DynamicMode::FocusContext => {
                let samples = active.buffer.get(DYNAMIC_STAGE);
                let outcome =
                    self.focus
                        .render(&mut self.dynamic, samples, &state, active.generation, color);
                outcome != FocusOutcome::Skipped
            }
            DynamicMode::LiveTap => match tap {
                Some(tap) => {
                    let stats = self.live.render(&mut self.dynamic, tap.snapshot(), color);
                    stats.points > 0
                }
                None => false,
            },
        }
    }

    pub fn set_dynamic_mode(&mut self, mode: DynamicMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!(%mode, "dynamic mode changed");
        self.mode = mode;
        self.dynamic.clear();
        self.focus.reset();
        self.refresh_dynamic();
    }

    pub fn dynamic_mode(&self) -> DynamicMode {
        self.mode
    }

    pub fn stage_surface(&self, stage: Stage) -> &PixelSurface {
        &self.stages[stage.index()]
    }

    pub fn dynamic_surface(&self) -> &PixelSurface {
        &self.dynamic
    }

    pub fn results(&self) -> Option<&SampleBuffer> {
        self.active.as_ref().map(|active| &active.buffer)
    }

    /// Playback state of the active results (Idle without results)
    pub fn playback(&self) -> PlaybackState {
        self.active
            .as_ref()
            .map(|active| active.sync.snapshot())
            .unwrap_or_default()
    }

    /// Number of result sets shown so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_animating(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Draw the focus renderer once outside the frame loop
    ///
    /// With an unknown duration this is the static fallback.
    fn refresh_dynamic(&mut self) {
        if self.mode != DynamicMode::FocusContext {
            return;
        }
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let state = active.sync.snapshot();
        self.focus.render(
            &mut self.dynamic,
            active.buffer.get(DYNAMIC_STAGE),
            &state,
            active.generation,
            stage_color(DYNAMIC_STAGE),
        );
    }

    fn clear_surfaces(&mut self) {
        for surface in &mut self.stages {
            surface.clear();
        }
        self.dynamic.clear();
    }
}

impl Default for PipelineView {
    fn default() -> Self {
        Self::new(DynamicMode::default())
    }
}

impl fmt::Debug for PipelineView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineView")
            .field("mode", &self.mode)
            .field("generation", &self.generation)
            .field("animating", &self.is_animating())
            .finish()
    }
}
