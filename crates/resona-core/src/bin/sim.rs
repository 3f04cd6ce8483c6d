//! Headless end-to-end run: a synthesized tone is fed through the capture
//! session and every style renders a short burst of frames.
//!
//! Useful for eyeballing the pipeline without a device or a display:
//!
//! ```sh
//! RUST_LOG=info cargo run --bin resona-sim
//! ```

use std::f32::consts::TAU;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use resona_core::{
    AnalysisState, CaptureSource, SessionController, Style, Viewport, VisualizationConfig,
    VisualizationEngine,
};

/// 220 Hz tone with a slow amplitude wobble, delivered in 1024-sample blocks.
struct ToneSource {
    sample_rate: u32,
    t: u64,
}

impl ToneSource {
    fn new(sample_rate: u32) -> Self {
        Self { sample_rate, t: 0 }
    }
}

impl CaptureSource for ToneSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, buf: &mut [f32]) -> usize {
        let n = buf.len().min(1024);
        let sr = self.sample_rate as f32;
        for s in &mut buf[..n] {
            let t = self.t as f32 / sr;
            let envelope = 0.3 + 0.25 * (TAU * 0.5 * t).sin();
            *s = envelope * (TAU * 220.0 * t).sin();
            self.t += 1;
        }
        n
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let state = Arc::new(AnalysisState::new());
    let mut session = SessionController::new(Arc::clone(&state));
    session.start(|| Ok(ToneSource::new(44_100)))?;

    // Let a few blocks land before rendering
    thread::sleep(Duration::from_millis(100));

    let mut engine = VisualizationEngine::new();
    let mut config = VisualizationConfig::default();
    let viewport = Viewport::new(800.0, 400.0);
    let frame = Duration::from_millis(16);

    for style in Style::ALL {
        config.style = style;
        let mut primitives = 0;
        for _ in 0..30 {
            primitives = engine
                .render_frame(frame, &state, &config, viewport)
                .len();
            thread::sleep(frame);
        }
        log::info!(
            "{:>9}: {primitives} primitives, loudness {:.3}, displayed {:.3}",
            style.name(),
            state.loudness(),
            engine.displayed_amplitude(),
        );
    }

    session.stop();
    log::info!(
        "session stopped, state back to zero: {}",
        state.current() == resona_core::FeatureVector::zeroed()
    );

    Ok(())
}
