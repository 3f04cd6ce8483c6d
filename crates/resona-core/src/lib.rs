//! Live audio analysis and procedural visualization engine.
//!
//! The pipeline: PCM sample blocks -> [`SignalAnalyzer`] -> smoothed
//! [`FeatureVector`] published on an [`AnalysisState`] -> [`VisualizationEngine`]
//! pulled once per display frame -> [`DrawPrimitive`] list for the host
//! rasterizer.
//!
//! Device capture and pixel drawing stay on the host side: a platform layer
//! opens the microphone and hands a [`CaptureSource`] to the
//! [`SessionController`], and whatever draws the frames consumes the
//! primitives. The capture worker and the renderer only ever meet through the
//! shared `AnalysisState` handle, which both sides read and write without
//! blocking each other.

pub mod audio;
pub mod config;
pub mod error;
pub mod render;

pub use audio::analyzer::SignalAnalyzer;
pub use audio::block::{SampleBlock, downmix_interleaved};
pub use audio::features::{FeatureVector, NUM_BANDS};
pub use audio::smoother::{AmplitudeSmoother, smooth};
pub use audio::state::{AnalysisState, HISTORY_INTERVAL, HISTORY_LEN};
pub use audio::{CaptureSource, SessionController};
pub use config::{DEFAULT_COLOR, Rgb, Style, VisualizationConfig};
pub use error::{ResonaError, Result};
pub use render::{Activity, DrawPrimitive, Rect, Rgba, Viewport, VisualizationEngine};
