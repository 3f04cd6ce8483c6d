pub mod primitives;
mod styles;

pub use primitives::{DrawPrimitive, Rect, Rgba};

use std::time::Duration;

use crate::audio::smoother::smooth;
use crate::audio::state::AnalysisState;
use crate::config::{Style, VisualizationConfig};

use self::styles::{FrameInput, ParticleField};

/// Angular step added to the animation phase every frame. A fixed per-frame
/// step, not wall-clock-scaled: animation speed follows the display refresh
/// rate. That coupling matches the reference behavior and is intentional.
pub const PHASE_INCREMENT: f32 = 0.08;

/// Render target dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Whether the engine has seen live data since construction or reset.
///
/// `Idle` renders the resting baseline. There is no automatic transition
/// back: session stop zeroes the feature vector, which the styles already
/// draw as the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Active,
}

/// Per-view frame state machine: pulls the current feature vector once per
/// display frame and turns it into draw primitives for the configured style.
///
/// Owns the animation phase and the particle field; never shared across
/// views. One engine instance pairs with the [`AnalysisState`] handle it is
/// rendered from.
pub struct VisualizationEngine {
    displayed_amplitude: f32,
    phase: f32,
    activity: Activity,
    particles: ParticleField,
}

impl VisualizationEngine {
    pub fn new() -> Self {
        Self {
            displayed_amplitude: 0.0,
            phase: 0.0,
            activity: Activity::Idle,
            particles: ParticleField::new(),
        }
    }

    /// Displayed amplitude after sensitivity and smoothing, in [0, 1].
    pub fn displayed_amplitude(&self) -> f32 {
        self.displayed_amplitude
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    /// Drop all per-view animation state back to the resting baseline.
    pub fn reset(&mut self) {
        self.displayed_amplitude = 0.0;
        self.phase = 0.0;
        self.activity = Activity::Idle;
        self.particles.reset();
    }

    /// Produce the primitives for one frame.
    ///
    /// Every frame, regardless of style: advance the displayed amplitude
    /// toward `clamp(loudness * sensitivity, 0, 1)`, step the phase, add the
    /// breathing term, offer the result to the history ring (rate-limited by
    /// the state's append gate), then dispatch to the style generator.
    pub fn render_frame(
        &mut self,
        elapsed: Duration,
        state: &AnalysisState,
        config: &VisualizationConfig,
        viewport: Viewport,
    ) -> Vec<DrawPrimitive> {
        let features = state.current();
        if state.has_received() {
            self.activity = Activity::Active;
        }

        let target = (features.loudness * config.sensitivity()).clamp(0.0, 1.0);
        self.displayed_amplitude =
            smooth(self.displayed_amplitude, target, config.smoothing());

        self.phase += PHASE_INCREMENT;
        // Small always-positive idle oscillation so the display never looks
        // frozen at silence
        let breathing = ((self.phase * 0.5).sin() * 0.02).max(0.0);

        state.push_history(self.displayed_amplitude + breathing, elapsed);
        let history = state.history_snapshot();

        let input = FrameInput {
            amplitude: self.displayed_amplitude,
            breathing,
            phase: self.phase,
            bands: &features.bands,
            history: &history,
            color: config.color,
            viewport,
        };

        match config.style {
            Style::Strings => styles::strings(&input),
            Style::Bars => styles::bars(&input),
            Style::Waves => styles::waves(&input),
            Style::ThinBars => styles::thin_bars(&input),
            Style::Particles => self.particles.advance_and_emit(&input),
            Style::Orbit => styles::orbit(&input),
            Style::Waveform => styles::waveform(&input),
        }
    }
}

impl Default for VisualizationEngine {
    fn default() -> Self {
        Self::new()
    }
}
