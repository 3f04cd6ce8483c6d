//! The seven style generators.
//!
//! Each generator is a pure function of the current frame input (plus the
//! persistent particle field for the `particles` style) and returns the
//! primitives for one frame. Heights, radii and alphas are clamped so nothing
//! renders negative or escapes the viewport.

use std::f32::consts::PI;

use glam::Vec2;

use super::Viewport;
use super::primitives::{DrawPrimitive, Rect, Rgba};
use crate::audio::features::NUM_BANDS;
use crate::audio::state::HISTORY_LEN;
use crate::config::Rgb;

/// Vertical safe-zone fraction kept clear at the top and bottom.
pub(crate) const PADDING_PERCENT: f32 = 0.15;

/// Number of particles in the `particles` style.
pub(crate) const PARTICLE_COUNT: usize = 40;

/// Everything a style generator may look at for one frame.
pub(crate) struct FrameInput<'a> {
    /// Displayed amplitude after sensitivity and smoothing, in [0, 1].
    pub amplitude: f32,
    /// Idle oscillation, always non-negative.
    pub breathing: f32,
    pub phase: f32,
    pub bands: &'a [f32; NUM_BANDS],
    pub history: &'a [f32; HISTORY_LEN],
    pub color: Rgb,
    pub viewport: Viewport,
}

#[inline]
fn lerp(start: f32, stop: f32, amount: f32) -> f32 {
    start + (stop - start) * amount
}

/// Asymmetric per-bar character so a wall of bars never looks uniform.
#[inline]
fn variant_scaling(index: usize) -> f32 {
    0.9 + 0.1 * (index as f32 * 0.1).sin()
}

/// Linear interpolation between the two nearest bands for a position in
/// [0, 1]. The upper neighbor clamps to the last band so a position of
/// exactly 1.0 stays in range.
pub(crate) fn band_value(bands: &[f32; NUM_BANDS], progress: f32) -> f32 {
    let scaled = progress * (NUM_BANDS - 1) as f32;
    let idx = (scaled as usize).min(NUM_BANDS - 1);
    let upper = (idx + 1).min(NUM_BANDS - 1);
    lerp(bands[idx], bands[upper], scaled - idx as f32)
}

/// Five overlapping sine strings with a Gaussian envelope tapering the
/// motion toward the viewport edges.
pub(crate) fn strings(input: &FrameInput) -> Vec<DrawPrimitive> {
    const LAYERS: usize = 5;
    const STEPS: usize = 60;

    let (w, h) = (input.viewport.width, input.viewport.height);
    let center_y = h / 2.0;
    let usable_height = h * (1.0 - PADDING_PERCENT * 2.0);
    let mut out = Vec::with_capacity(LAYERS);

    for i in 0..LAYERS {
        let fi = i as f32;
        let alpha = (0.6 * (1.0 - fi / LAYERS as f32) + 0.15 * (input.phase + fi).sin()).max(0.1);
        let speed = input.phase * (0.6 + fi * 0.2);
        let freq = 0.012 + fi * 0.004;
        let wave_amp =
            (input.amplitude + input.breathing) * usable_height * 0.5 * (1.0 - fi * 0.15);

        let step_width = w / STEPS as f32;
        let mut points = Vec::with_capacity(STEPS + 2);
        points.push(Vec2::new(0.0, center_y));
        for step in 0..=STEPS {
            let x = step as f32 * step_width;
            let dist_from_center =
                (step as f32 - STEPS as f32 / 2.0).abs() / (STEPS as f32 / 2.0);
            let envelope = (-dist_from_center * dist_from_center * 5.0).exp();
            let y = center_y + (x * freq + speed).sin() * wave_amp * envelope;
            points.push(Vec2::new(x, y));
        }

        out.push(DrawPrimitive::Stroke {
            points,
            color: Rgba::new(input.color, alpha),
            width: (4.0 - fi * 0.5).max(1.5),
            glow: 15.0,
        });
    }

    out
}

/// 70 mirrored bars driven by band interpolation.
pub(crate) fn bars(input: &FrameInput) -> Vec<DrawPrimitive> {
    const NUM_BARS: usize = 70;

    let (w, h) = (input.viewport.width, input.viewport.height);
    let bar_width = w / NUM_BARS as f32;
    let gap = bar_width * 0.4;
    let actual_bar_width = (bar_width - gap).max(3.0);
    let center_y = h / 2.0;
    let usable_height = h * (1.0 - PADDING_PERCENT * 2.0);
    let bump = input.amplitude + input.breathing;
    let mut out = Vec::with_capacity(NUM_BARS);

    for i in 0..NUM_BARS {
        // Symmetric fold: bars mirror around the center column
        let relative_idx = if i < NUM_BARS / 2 { i } else { NUM_BARS - 1 - i };
        let progress = relative_idx as f32 / (NUM_BARS as f32 / 2.0);
        let value = band_value(input.bands, progress);

        // Per-bar variation prevents a flat top at max volume
        let variation = 0.85 + 0.15 * (i as f32 * 0.4 + input.phase).sin();
        let bar_height = (value * usable_height * variant_scaling(i) * variation + 12.0 * bump)
            .clamp(8.0, usable_height);
        let x = i as f32 * bar_width + gap / 2.0;

        out.push(DrawPrimitive::RoundedRect {
            rect: Rect::new(x, center_y - bar_height / 2.0, actual_bar_width, bar_height),
            corner_radius: actual_bar_width / 2.0,
            color: Rgba::opaque(input.color),
            glow: 10.0,
        });
    }

    out
}

/// Three filled wave silhouettes anchored near the bottom of the viewport.
pub(crate) fn waves(input: &FrameInput) -> Vec<DrawPrimitive> {
    const LAYERS: usize = 3;
    const STEPS: usize = 40;

    let (w, h) = (input.viewport.width, input.viewport.height);
    let base_line = h * 0.7;
    let swell = (input.amplitude + input.breathing) * h * 0.2;
    let mut out = Vec::with_capacity(LAYERS);

    for i in 0..LAYERS {
        let fi = i as f32;
        let alpha = (0.35 + fi * 0.25).min(1.0);
        let speed = input.phase * (0.5 + fi * 0.25);
        let freq = 0.007 + fi * 0.003;
        let layer_offset = fi * (h * 0.05);

        let step_width = w / STEPS as f32;
        let mut points = Vec::with_capacity(STEPS + 4);
        points.push(Vec2::new(0.0, h));
        points.push(Vec2::new(0.0, base_line + layer_offset));
        for step in 0..=STEPS {
            let x = step as f32 * step_width;
            let y = base_line + layer_offset + (x * freq + speed).sin() * swell;
            points.push(Vec2::new(x, y.min(h - 5.0)));
        }
        points.push(Vec2::new(w, h));

        out.push(DrawPrimitive::Fill {
            points,
            color: Rgba::new(input.color, alpha),
        });
    }

    out
}

/// 100 narrow bars, denser and thinner than [`bars`], no mirror fold.
pub(crate) fn thin_bars(input: &FrameInput) -> Vec<DrawPrimitive> {
    const NUM_BARS: usize = 100;

    let (w, h) = (input.viewport.width, input.viewport.height);
    let bar_width = w / NUM_BARS as f32;
    let actual_bar_width = 2.0;
    let gap = bar_width - actual_bar_width;
    let center_y = h / 2.0;
    let usable_height = h * (1.0 - PADDING_PERCENT * 2.0);
    let bump = input.amplitude + input.breathing;
    let mut out = Vec::with_capacity(NUM_BARS);

    for i in 0..NUM_BARS {
        let progress = i as f32 / NUM_BARS as f32;
        let value = band_value(input.bands, progress);

        let variation = 0.8 + 0.2 * (i as f32 * 0.8 + input.phase).sin();
        let bar_height =
            (value * usable_height * variation + 6.0 * bump).clamp(4.0, usable_height);
        let x = i as f32 * bar_width + gap / 2.0;

        out.push(DrawPrimitive::RoundedRect {
            rect: Rect::new(x, center_y - bar_height / 2.0, actual_bar_width, bar_height),
            corner_radius: 0.0,
            color: Rgba::opaque(input.color),
            glow: 5.0,
        });
    }

    out
}

/// Four concentric arc pairs whose radius and sweep grow with amplitude.
pub(crate) fn orbit(input: &FrameInput) -> Vec<DrawPrimitive> {
    const LAYERS: usize = 4;

    let (w, h) = (input.viewport.width, input.viewport.height);
    let center = Vec2::new(w / 2.0, h / 2.0);
    let usable_radius = w.min(h) * 0.4;
    let mut out = Vec::with_capacity(LAYERS * 2);

    for i in 0..LAYERS {
        let fi = i as f32;
        let radius = usable_radius * 0.4 + fi * 15.0 + input.amplitude * usable_radius * 0.5;
        let color = Rgba::new(input.color, (1.0 - fi * 0.2).max(0.1));
        let width = (5.0 - fi).max(1.0);
        let start_angle = input.phase * 3.0 + fi * PI / 2.0;
        let sweep = PI / 3.0 + input.amplitude * PI;

        for half in 0..2 {
            out.push(DrawPrimitive::Arc {
                center,
                radius,
                start_angle: start_angle + half as f32 * PI,
                sweep,
                width,
                color,
                glow: 15.0,
            });
        }
    }

    out
}

/// One bar per history slot, oldest to newest left-to-right. The only style
/// that draws history instead of the instantaneous vector.
pub(crate) fn waveform(input: &FrameInput) -> Vec<DrawPrimitive> {
    let (w, h) = (input.viewport.width, input.viewport.height);
    let bar_width = w / HISTORY_LEN as f32;
    let gap = bar_width * 0.3;
    let actual_bar_width = (bar_width - gap).max(2.0);
    let center_y = h / 2.0;
    let usable_height = h * (1.0 - PADDING_PERCENT * 2.0);
    let mut out = Vec::with_capacity(HISTORY_LEN);

    for (i, &amp) in input.history.iter().enumerate() {
        let bar_height = (amp * usable_height + 4.0).clamp(4.0, usable_height);
        let x = i as f32 * bar_width + gap / 2.0;

        out.push(DrawPrimitive::RoundedRect {
            rect: Rect::new(x, center_y - bar_height / 2.0, actual_bar_width, bar_height),
            corner_radius: actual_bar_width / 2.0,
            color: Rgba::opaque(input.color),
            glow: 8.0,
        });
    }

    out
}

// LCG constants shared with the deterministic sampling elsewhere in the
// codebase's lineage; fixed seed keeps first-render placement reproducible.
const LCG_MULT: u64 = 6364136223846793005;
const LCG_INC: u64 = 1442695040888963407;

struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(LCG_MULT).wrapping_add(LCG_INC);
        ((self.0 >> 40) as f32) / (1u64 << 24) as f32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

struct Particle {
    pos: Vec2,
    vel: Vec2,
    size: f32,
    alpha: f32,
}

/// Persistent drifting particle set for the `particles` style, owned by one
/// engine instance and lazily placed on first render.
pub(crate) struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub(crate) fn new() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.particles.clear();
    }

    fn ensure_initialized(&mut self, viewport: Viewport) {
        if !self.particles.is_empty() {
            return;
        }
        let mut rng = Lcg(42);
        self.particles = (0..PARTICLE_COUNT)
            .map(|_| Particle {
                pos: Vec2::new(
                    rng.range(0.0, viewport.width),
                    rng.range(0.0, viewport.height),
                ),
                vel: Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 1.0)),
                size: rng.range(4.0, 10.0),
                alpha: rng.range(0.2, 0.8),
            })
            .collect();
    }

    /// Advance every particle one frame and emit it as a circle. Motion
    /// speeds up with amplitude; positions wrap toroidally at the edges.
    pub(crate) fn advance_and_emit(&mut self, input: &FrameInput) -> Vec<DrawPrimitive> {
        self.ensure_initialized(input.viewport);

        let (w, h) = (input.viewport.width, input.viewport.height);
        let drive = 1.0 + input.amplitude * 5.0;
        let mut out = Vec::with_capacity(self.particles.len());

        for p in &mut self.particles {
            p.pos += p.vel * drive;
            if p.pos.x < 0.0 {
                p.pos.x = w;
            }
            if p.pos.x > w {
                p.pos.x = 0.0;
            }
            if p.pos.y < 0.0 {
                p.pos.y = h;
            }
            if p.pos.y > h {
                p.pos.y = 0.0;
            }

            let size = p.size * (1.0 + input.amplitude * 1.5);
            out.push(DrawPrimitive::Circle {
                center: p.pos,
                radius: size / 2.0,
                color: Rgba::new(input.color, p.alpha),
                glow: 12.0,
            });
        }

        out
    }
}
