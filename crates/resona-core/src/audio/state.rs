use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering, fence};
use std::time::Duration;

use super::analyzer::SignalAnalyzer;
use super::block::SampleBlock;
use super::features::{FeatureVector, NUM_BANDS};
use super::smoother::AmplitudeSmoother;

/// History ring capacity (5 s of loudness at the append cadence).
pub const HISTORY_LEN: usize = 100;

/// Minimum spacing between history appends (~20 Hz). Faster callers are
/// coalesced, not queued.
pub const HISTORY_INTERVAL: Duration = Duration::from_millis(50);

const FEATURE_WORDS: usize = NUM_BANDS + 1;

/// Versioned snapshot cell for the feature vector.
///
/// Single producer (the analysis path), any number of readers. The producer
/// bumps the version to an odd value before touching the payload and to the
/// next even value after; readers retry while the version is odd or changed
/// under them, so a read never observes a half-written vector and never
/// blocks the producer. All payload accesses go through atomics, the version
/// protocol only rejects torn combinations.
struct FeatureCell {
    version: AtomicU32,
    words: [AtomicU32; FEATURE_WORDS],
}

impl FeatureCell {
    fn new() -> Self {
        Self {
            version: AtomicU32::new(0),
            words: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    fn store(&self, value: &FeatureVector) {
        let v = self.version.load(Ordering::Relaxed);
        self.version.store(v.wrapping_add(1), Ordering::Relaxed);
        // Orders the odd version store before the payload stores for any
        // reader that observes one of them.
        fence(Ordering::Release);
        for (word, &f) in self.words.iter().zip(value.as_slice()) {
            word.store(f.to_bits(), Ordering::Relaxed);
        }
        self.version.store(v.wrapping_add(2), Ordering::Release);
    }

    fn load(&self) -> FeatureVector {
        loop {
            let v1 = self.version.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }
            let mut out = FeatureVector::zeroed();
            for (word, f) in self.words.iter().zip(out.as_slice_mut()) {
                *f = f32::from_bits(word.load(Ordering::Relaxed));
            }
            // Orders the payload loads before the version re-check.
            fence(Ordering::Acquire);
            if self.version.load(Ordering::Relaxed) == v1 {
                return out;
            }
        }
    }
}

/// Fixed-capacity ring of past smoothed loudness values, oldest first.
///
/// Appends shift left by one slot; the buffer always holds exactly
/// [`HISTORY_LEN`] values, zero-filled until real samples arrive.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    slots: [f32; HISTORY_LEN],
}

impl HistoryRing {
    pub fn new() -> Self {
        Self {
            slots: [0.0; HISTORY_LEN],
        }
    }

    pub fn push(&mut self, value: f32) {
        self.slots.copy_within(1.., 0);
        self.slots[HISTORY_LEN - 1] = value;
    }

    pub fn clear(&mut self) {
        self.slots = [0.0; HISTORY_LEN];
    }

    pub fn snapshot(&self) -> [f32; HISTORY_LEN] {
        self.slots
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}

struct History {
    ring: HistoryRing,
    since_append: Duration,
}

/// Process-wide current feature vector plus the amplitude history ring.
///
/// Exactly one writer updates the feature vector (the analysis path) and one
/// writer appends history (the frame tick); the renderer reads both at its
/// own cadence without blocking either writer. Created all-zero, returned to
/// all-zero by [`reset`](Self::reset).
pub struct AnalysisState {
    analyzer: SignalAnalyzer,
    cell: FeatureCell,
    smoother: Mutex<AmplitudeSmoother>,
    history: Mutex<History>,
    received: AtomicBool,
    sample_rate: AtomicU32,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self {
            analyzer: SignalAnalyzer::new(),
            cell: FeatureCell::new(),
            // Loudness passes through unsmoothed by default; hosts that want
            // analysis-side damping opt in via `set_loudness_smoothing`.
            smoother: Mutex::new(AmplitudeSmoother::new(0.0)),
            history: Mutex::new(History {
                ring: HistoryRing::new(),
                since_append: Duration::ZERO,
            }),
            received: AtomicBool::new(false),
            sample_rate: AtomicU32::new(0),
        }
    }

    /// Analyze one block and publish the result. `sample_rate` is
    /// informational only; the analyzer normalizes by sample magnitude, not
    /// frequency.
    pub fn push_block(&self, block: &SampleBlock, sample_rate: u32) {
        let mut fv = self.analyzer.analyze(block);
        if let Ok(mut smoother) = self.smoother.lock() {
            fv.loudness = smoother.advance(fv.loudness);
        }
        self.cell.store(&fv);
        self.sample_rate.store(sample_rate, Ordering::Relaxed);
        self.received.store(true, Ordering::Release);
    }

    /// Latest published feature vector. Non-blocking, always well-defined:
    /// all-zero before the first block and after a reset.
    pub fn current(&self) -> FeatureVector {
        self.cell.load()
    }

    pub fn loudness(&self) -> f32 {
        self.current().loudness
    }

    pub fn bands(&self) -> [f32; NUM_BANDS] {
        self.current().bands
    }

    /// Whether any block has been published since construction or the last
    /// reset.
    pub fn has_received(&self) -> bool {
        self.received.load(Ordering::Acquire)
    }

    /// Last reported capture sample rate, 0 before the first block.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Relaxed)
    }

    /// Exponential smoothing applied to loudness on the analysis path,
    /// clamped to [0, 1]. Zero (the default) publishes raw values.
    pub fn set_loudness_smoothing(&self, smoothing: f32) {
        if let Ok(mut smoother) = self.smoother.lock() {
            smoother.set_smoothing(smoothing);
        }
    }

    /// Offer `value` to the history ring. Appends are rate-limited to one
    /// per [`HISTORY_INTERVAL`] of accumulated `elapsed` time; offers inside
    /// the window are coalesced. Returns whether the value was recorded.
    pub fn push_history(&self, value: f32, elapsed: Duration) -> bool {
        let Ok(mut history) = self.history.lock() else {
            return false;
        };
        history.since_append += elapsed;
        if history.since_append < HISTORY_INTERVAL {
            return false;
        }
        history.since_append = Duration::ZERO;
        history.ring.push(value);
        true
    }

    /// Copy of the history ring, oldest to newest.
    pub fn history_snapshot(&self) -> [f32; HISTORY_LEN] {
        self.history
            .lock()
            .map(|history| history.ring.snapshot())
            .unwrap_or([0.0; HISTORY_LEN])
    }

    /// Return every field to its all-zero starting point.
    pub fn reset(&self) {
        self.cell.store(&FeatureVector::zeroed());
        if let Ok(mut smoother) = self.smoother.lock() {
            smoother.reset();
        }
        if let Ok(mut history) = self.history.lock() {
            history.ring.clear();
            history.since_append = Duration::ZERO;
        }
        self.received.store(false, Ordering::Release);
    }
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_zero_before_first_block() {
        let state = AnalysisState::new();
        assert_eq!(state.current(), FeatureVector::zeroed());
        assert!(!state.has_received());
    }

    #[test]
    fn push_then_read() {
        let state = AnalysisState::new();
        let block = vec![i16::MAX; 1024];
        state.push_block(&SampleBlock::I16(&block), 44_100);

        let fv = state.current();
        assert_eq!(fv.loudness, 1.0);
        assert!(state.has_received());
        assert_eq!(state.sample_rate(), 44_100);
    }

    #[test]
    fn reset_returns_to_zero() {
        let state = AnalysisState::new();
        let block = vec![i16::MAX / 2; 512];
        state.push_block(&SampleBlock::I16(&block), 48_000);
        state.push_history(0.7, HISTORY_INTERVAL);

        state.reset();
        assert_eq!(state.current(), FeatureVector::zeroed());
        assert_eq!(state.history_snapshot(), [0.0; HISTORY_LEN]);
        assert!(!state.has_received());
    }

    #[test]
    fn ring_keeps_last_values_in_arrival_order() {
        let mut ring = HistoryRing::new();
        for i in 0..150 {
            ring.push(i as f32);
        }
        let snap = ring.snapshot();
        // Oldest evicted first: slots hold 50..150
        assert_eq!(snap[0], 50.0);
        assert_eq!(snap[HISTORY_LEN - 1], 149.0);
        for w in snap.windows(2) {
            assert_eq!(w[1] - w[0], 1.0);
        }
    }

    #[test]
    fn ring_clear_is_all_zero() {
        let mut ring = HistoryRing::new();
        ring.push(1.0);
        ring.clear();
        assert_eq!(ring.snapshot(), [0.0; HISTORY_LEN]);
    }

    #[test]
    fn history_gate_coalesces_fast_offers() {
        let state = AnalysisState::new();
        let dt = Duration::from_millis(16);
        // 16 + 16 < 50: first two offers coalesce, third crosses the gate
        assert!(!state.push_history(0.1, dt));
        assert!(!state.push_history(0.2, dt));
        assert!(state.push_history(0.3, dt + dt));
        let snap = state.history_snapshot();
        assert_eq!(snap[HISTORY_LEN - 1], 0.3);
        assert_eq!(snap[HISTORY_LEN - 2], 0.0);
    }

    #[test]
    fn history_gate_passes_slow_offers() {
        let state = AnalysisState::new();
        for i in 0..5 {
            assert!(state.push_history(i as f32, HISTORY_INTERVAL));
        }
        let snap = state.history_snapshot();
        assert_eq!(snap[HISTORY_LEN - 1], 4.0);
        assert_eq!(snap[HISTORY_LEN - 5], 0.0);
    }

    #[test]
    fn analysis_smoothing_damps_published_loudness() {
        let state = AnalysisState::new();
        state.set_loudness_smoothing(0.5);
        let block = vec![i16::MAX; 1024];
        state.push_block(&SampleBlock::I16(&block), 44_100);
        // First step from zero toward 1.0 at coefficient 0.5
        assert!((state.loudness() - 0.5).abs() < 1e-6);
        state.push_block(&SampleBlock::I16(&block), 44_100);
        assert!((state.loudness() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn snapshot_cell_is_consistent_under_concurrent_writes() {
        use std::sync::Arc;

        let state = Arc::new(AnalysisState::new());
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let state = Arc::clone(&state);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                // Alternate two blocks whose loudness and bands differ so a
                // torn read would mix fields from both.
                let loud = vec![i16::MAX; 700];
                let quiet = vec![i16::MAX / 4; 700];
                for i in 0..2000 {
                    let block = if i % 2 == 0 { &loud } else { &quiet };
                    state.push_block(&SampleBlock::I16(block), 44_100);
                }
                done.store(true, Ordering::Release);
            })
        };

        let analyzer = SignalAnalyzer::new();
        let loud = vec![i16::MAX; 700];
        let quiet = vec![i16::MAX / 4; 700];
        let expect_loud = analyzer.analyze(&SampleBlock::I16(&loud));
        let expect_quiet = analyzer.analyze(&SampleBlock::I16(&quiet));

        while !done.load(Ordering::Acquire) {
            let fv = state.current();
            let ok = fv == FeatureVector::zeroed() || fv == expect_loud || fv == expect_quiet;
            assert!(ok, "torn read: {fv:?}");
        }
        writer.join().unwrap();
    }
}
