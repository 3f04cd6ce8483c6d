/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ResonaError>;

/// Errors surfaced by the engine.
///
/// The real-time paths (block analysis, frame rendering) never return errors:
/// malformed input is treated as silence so a glitchy capture device cannot
/// take the display down. Only session setup and config persistence can fail.
#[derive(Debug, thiserror::Error)]
pub enum ResonaError {
    /// The capture device or session could not be initialized. The current
    /// `start` call fails, the session stays stopped, and no partial state is
    /// retained.
    #[error("capture initialization failed: {0}")]
    CaptureInit(String),
    /// Config file could not be written.
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    /// Config could not be encoded as JSON.
    #[error("config serialization: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}
