use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Accent color used when the host never sets one (or sets garbage).
pub const DEFAULT_COLOR: Rgb = Rgb {
    r: 0x00,
    g: 0xD9,
    b: 0xFF,
};

/// The seven selectable visualization styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    Strings,
    Bars,
    Waves,
    ThinBars,
    Particles,
    Orbit,
    Waveform,
}

impl Style {
    pub const ALL: [Style; 7] = [
        Style::Strings,
        Style::Bars,
        Style::Waves,
        Style::ThinBars,
        Style::Particles,
        Style::Orbit,
        Style::Waveform,
    ];

    /// Parse a style name as the host hands it over. Unrecognized names fall
    /// back to [`Style::Strings`] rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "bars" => Style::Bars,
            "waves" => Style::Waves,
            "thin-bars" => Style::ThinBars,
            "particles" => Style::Particles,
            "orbit" => Style::Orbit,
            "waveform" => Style::Waveform,
            _ => Style::Strings,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Style::Strings => "strings",
            Style::Bars => "bars",
            Style::Waves => "waves",
            Style::ThinBars => "thin-bars",
            Style::Particles => "particles",
            Style::Orbit => "orbit",
            Style::Waveform => "waveform",
        }
    }
}

/// 8-bit RGB color. Hosts pass colors as `#RRGGBB` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional, case-insensitive). Anything
    /// else yields the default accent so a bad prop never breaks rendering.
    pub fn from_hex(hex: &str) -> Self {
        let s = hex.trim().trim_start_matches('#');
        if s.len() == 6 {
            if let Ok(v) = u32::from_str_radix(s, 16) {
                return Self {
                    r: (v >> 16) as u8,
                    g: (v >> 8) as u8,
                    b: v as u8,
                };
            }
        }
        DEFAULT_COLOR
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        DEFAULT_COLOR
    }
}

/// Per-view rendering configuration. Immutable during a frame, replaceable
/// between frames.
///
/// `sensitivity` and `smoothing` are clamped by their setters (to [0, 2] and
/// [0, 1] respectively); out-of-range input is clamped, not rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationConfig {
    pub style: Style,
    pub color: Rgb,
    sensitivity: f32,
    smoothing: f32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            style: Style::default(),
            color: DEFAULT_COLOR,
            sensitivity: 1.0,
            smoothing: 0.7,
        }
    }
}

impl VisualizationConfig {
    /// Gain applied to raw loudness before display, in [0, 2].
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, value: f32) {
        self.sensitivity = value.clamp(0.0, 2.0);
    }

    /// Exponential-approach coefficient for the displayed amplitude, in
    /// [0, 1]. Zero snaps to the target instantly.
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, value: f32) {
        self.smoothing = value.clamp(0.0, 1.0);
    }

    /// Load the persisted config, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(config_dir) = dirs::config_dir() else {
            return Self::default();
        };
        Self::load_from(&config_dir.join("resona").join("config.json"))
    }

    fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let mut cfg: Self = serde_json::from_str(&json).unwrap_or_default();
                // Persisted files bypass the setters; re-clamp on the way in.
                cfg.sensitivity = cfg.sensitivity.clamp(0.0, 2.0);
                cfg.smoothing = cfg.smoothing.clamp(0.0, 1.0);
                cfg
            }
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(());
        };
        let dir = config_dir.join("resona");
        std::fs::create_dir_all(&dir)?;
        self.save_to(&dir.join("config.json"))
    }

    fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
