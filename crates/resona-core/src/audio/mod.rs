pub mod analyzer;
pub mod block;
pub mod features;
pub mod smoother;
pub mod state;

pub use features::{FeatureVector, NUM_BANDS};
pub use state::AnalysisState;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use self::block::SampleBlock;
use crate::error::{ResonaError, Result};

/// Poll interval for the capture worker.
const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Worker-side read buffer length in samples.
const READ_BUF_LEN: usize = 4096;

/// Whatever delivers PCM blocks: a device tap on the platform side, a file
/// reader, a synthesized tone in tests. The core never opens devices itself;
/// the caller opens the source and hands it to [`SessionController::start`].
pub trait CaptureSource: Send + 'static {
    /// Nominal sample rate, informational only.
    fn sample_rate(&self) -> u32;

    /// Copy up to `buf.len()` pending mono samples into `buf` and return the
    /// count. Zero means nothing pending yet, not end of stream. Must not
    /// block.
    fn read(&mut self, buf: &mut [f32]) -> usize;
}

/// Owns the capture worker: start/stop of the background cadence that feeds
/// sample blocks into an [`AnalysisState`].
///
/// The controller holds the specific state instance it feeds; views render
/// from the same handle instead of discovering it through globals.
pub struct SessionController {
    state: Arc<AnalysisState>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    sender: Sender<FeatureVector>,
    receiver: Receiver<FeatureVector>,
    latest: Option<FeatureVector>,
}

impl SessionController {
    pub fn new(state: Arc<AnalysisState>) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(4);
        Self {
            state,
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            sender,
            receiver,
            latest: None,
        }
    }

    /// Open a source via `open` and start feeding its blocks into the state.
    ///
    /// Idempotent: calling while already active is a no-op. If `open` fails
    /// the error is returned as-is, the session stays stopped, and the state
    /// is untouched.
    pub fn start<S, F>(&mut self, open: F) -> Result<()>
    where
        S: CaptureSource,
        F: FnOnce() -> Result<S>,
    {
        if self.is_active() {
            log::debug!("capture session already active");
            return Ok(());
        }

        let source = open()?;
        log::info!("capture session started ({} Hz)", source.sample_rate());

        self.stop.store(false, Ordering::Release);
        let state = Arc::clone(&self.state);
        let stop = Arc::clone(&self.stop);
        let tx = self.sender.clone();
        let handle = thread::Builder::new()
            .name("resona-capture".into())
            .spawn(move || capture_worker(source, &state, &stop, &tx))
            .map_err(|e| ResonaError::CaptureInit(format!("worker spawn failed: {e}")))?;
        self.worker = Some(handle);

        Ok(())
    }

    /// Stop feeding and reset the state. Joins the worker first so no write
    /// lands after this returns.
    pub fn stop(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        if handle.join().is_err() {
            log::error!("capture worker panicked");
        }
        self.state.reset();
        self.latest = None;
        log::info!("capture session stopped");
    }

    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// The analysis state this controller feeds.
    pub fn state(&self) -> &Arc<AnalysisState> {
        &self.state
    }

    /// Drain the worker channel and return the most recent feature vector,
    /// if any arrived since the session started.
    pub fn latest(&mut self) -> Option<FeatureVector> {
        while let Ok(fv) = self.receiver.try_recv() {
            self.latest = Some(fv);
        }
        self.latest
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_worker(
    mut source: impl CaptureSource,
    state: &AnalysisState,
    stop: &AtomicBool,
    tx: &Sender<FeatureVector>,
) {
    let sample_rate = source.sample_rate();
    let mut buf = vec![0.0f32; READ_BUF_LEN];

    while !stop.load(Ordering::Acquire) {
        let read = source.read(&mut buf);
        if read > 0 {
            state.push_block(&SampleBlock::F32(&buf[..read]), sample_rate);
            // Non-blocking send; drop if the consumer is behind
            let _ = tx.try_send(state.current());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that hands out a fixed full-scale block a limited number of
    /// times, then reports silence.
    struct PulseSource {
        remaining: usize,
    }

    impl CaptureSource for PulseSource {
        fn sample_rate(&self) -> u32 {
            44_100
        }

        fn read(&mut self, buf: &mut [f32]) -> usize {
            if self.remaining == 0 {
                return 0;
            }
            self.remaining -= 1;
            let n = buf.len().min(1024);
            for s in &mut buf[..n] {
                *s = 1.0;
            }
            n
        }
    }

    fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
        for _ in 0..200 {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn start_feeds_state() {
        let state = Arc::new(AnalysisState::new());
        let mut session = SessionController::new(Arc::clone(&state));
        session.start(|| Ok(PulseSource { remaining: 3 })).unwrap();
        assert!(session.is_active());

        assert!(wait_for(|| state.loudness() == 1.0), "no block arrived");
        assert!(session.latest().is_some());
        session.stop();
    }

    #[test]
    fn start_is_idempotent() {
        let state = Arc::new(AnalysisState::new());
        let mut session = SessionController::new(state);
        session.start(|| Ok(PulseSource { remaining: 1 })).unwrap();

        // Second start must not replace the worker or touch state
        let started_twice = session.start(|| -> Result<PulseSource> {
            panic!("source opened while already active")
        });
        assert!(started_twice.is_ok());
        session.stop();
    }

    #[test]
    fn open_failure_leaves_session_stopped() {
        let state = Arc::new(AnalysisState::new());
        let mut session = SessionController::new(Arc::clone(&state));

        let result = session.start(|| -> Result<PulseSource> {
            Err(ResonaError::CaptureInit("no input device".into()))
        });
        assert!(matches!(result, Err(ResonaError::CaptureInit(_))));
        assert!(!session.is_active());
        assert_eq!(state.current(), FeatureVector::zeroed());
    }

    #[test]
    fn stop_resets_state_and_allows_restart() {
        let state = Arc::new(AnalysisState::new());
        let mut session = SessionController::new(Arc::clone(&state));
        session.start(|| Ok(PulseSource { remaining: 5 })).unwrap();
        assert!(wait_for(|| state.loudness() > 0.0));

        session.stop();
        assert!(!session.is_active());
        // No write lands after stop: the vector stays zero
        assert_eq!(state.current(), FeatureVector::zeroed());
        thread::sleep(Duration::from_millis(30));
        assert_eq!(state.current(), FeatureVector::zeroed());

        session.start(|| Ok(PulseSource { remaining: 2 })).unwrap();
        assert!(wait_for(|| state.loudness() > 0.0));
        session.stop();
    }

    #[test]
    fn stop_without_start_is_a_noop() {
        let state = Arc::new(AnalysisState::new());
        let mut session = SessionController::new(state);
        session.stop();
        assert!(!session.is_active());
    }
}
