//! Paced, cancellable preview playback.
//!
//! ```text
//! Idle ──run──▶ Playing { index: 0 } ──▶ … ──▶ Playing { index: n-1 } ──▶ Idle
//!                    │
//!                    └──stop (checked before each syllable)──▶ Idle
//! ```
//!
//! Each syllable is rendered on the blocking pool, handed to the
//! [`PlaybackSink`], and followed by a pause of its own duration plus a fixed
//! gap. Stopping never silences audio that has already been handed to the
//! sink; it only skips the syllables after it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use derive_builder::Builder;
use tokio::sync::watch;

use crate::synth::{render_syllable, FailureCause, RenderEvent, RenderFailure, RenderResult};
use crate::syllable::{Syllable, SyllableId};
use crate::{SpeechEngine, TARGET_SAMPLE_RATE};

/// Where preview audio goes.
pub trait PlaybackSink: Send + Sync {
    /// Start playing `samples`. Must return without waiting for playback
    /// to finish.
    fn play(&self, samples: &[f32], sample_rate: u32);
}

/// Discards everything it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PlaybackSink for NullSink {
    fn play(&self, samples: &[f32], sample_rate: u32) {
        log::debug!("Dropping {} samples at {sample_rate} Hz", samples.len());
    }
}

/// Keeps every buffer it is asked to play.
#[derive(Debug, Default)]
pub struct CaptureSink {
    played: Mutex<Vec<Vec<f32>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers played so far, in order, leaving the sink empty.
    pub fn take(&self) -> Vec<Vec<f32>> {
        std::mem::take(&mut *self.played.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl PlaybackSink for CaptureSink {
    fn play(&self, samples: &[f32], _sample_rate: u32) {
        self.played
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(samples.to_vec());
    }
}

/// Shared stop flag, polled once per syllable.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct PreviewOptions {
    /// Pause added after every syllable, including failed ones.
    pub gap: Duration,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            gap: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    /// Syllable `index` of the snapshot is the one being heard.
    Playing { index: usize },
}

impl PreviewState {
    /// Index of the highlighted syllable, if any.
    pub fn highlighted(&self) -> Option<usize> {
        match self {
            PreviewState::Idle => None,
            PreviewState::Playing { index } => Some(*index),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewReport {
    /// Syllables handed to the sink.
    pub played: usize,
    pub failed: Vec<SyllableId>,
    /// `true` when a stop request cut the sequence short.
    pub cancelled: bool,
}

pub struct PreviewScheduler<E, S: ?Sized> {
    engine: Arc<E>,
    sink: Arc<S>,
    options: PreviewOptions,
    state: watch::Sender<PreviewState>,
}

impl<E, S> PreviewScheduler<E, S>
where
    E: SpeechEngine + Send + Sync + 'static,
    S: PlaybackSink + ?Sized,
{
    pub fn new(engine: Arc<E>, sink: Arc<S>, options: PreviewOptions) -> Self {
        let (state, _) = watch::channel(PreviewState::Idle);
        Self {
            engine,
            sink,
            options,
            state,
        }
    }

    pub fn state(&self) -> PreviewState {
        *self.state.borrow()
    }

    /// Follow state changes, e.g. to highlight the syllable being played.
    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.subscribe()
    }

    /// Play `syllables` in order until the end or until `stop` is raised.
    ///
    /// `stop` is cleared when the run starts. Returns `None` without playing
    /// anything when another run is already in progress on this scheduler.
    pub async fn run<F>(
        &self,
        syllables: Arc<[Syllable]>,
        stop: &StopHandle,
        mut observer: F,
    ) -> Option<PreviewReport>
    where
        F: FnMut(&RenderEvent),
    {
        if !self.claim(syllables.len()) {
            log::warn!("Preview already running, ignoring start request");
            return None;
        }
        stop.reset();
        log::info!("Previewing {} syllables", syllables.len());

        let mut report = PreviewReport::default();
        for index in 0..syllables.len() {
            if stop.is_stopped() {
                log::info!("Preview stopped before syllable {index}");
                report.cancelled = true;
                break;
            }

            let id = syllables[index].id();
            self.set_state(PreviewState::Playing { index });
            observer(&RenderEvent::Started { index, syllable: id });

            let wait = match self.render(&syllables, index).await {
                Ok(samples) => {
                    self.sink.play(&samples, TARGET_SAMPLE_RATE);
                    report.played += 1;
                    observer(&RenderEvent::Completed {
                        index,
                        syllable: id,
                        samples: samples.len(),
                    });
                    playback_duration(samples.len()) + self.options.gap
                }
                Err(failure) => {
                    log::warn!("{failure}");
                    report.failed.push(id);
                    observer(&RenderEvent::Failed { index, failure });
                    self.options.gap
                }
            };

            tokio::time::sleep(wait).await;
        }

        self.set_state(PreviewState::Idle);
        Some(report)
    }

    /// Move from `Idle` to the first syllable in one step. An empty list
    /// claims nothing but still counts as a successful start.
    fn claim(&self, len: usize) -> bool {
        let mut started = false;
        self.state.send_if_modified(|state| {
            if *state != PreviewState::Idle {
                return false;
            }
            started = true;
            if len == 0 {
                return false;
            }
            *state = PreviewState::Playing { index: 0 };
            true
        });
        started
    }

    fn set_state(&self, next: PreviewState) {
        self.state.send_if_modified(|state| {
            let changed = *state != next;
            *state = next;
            changed
        });
    }

    async fn render(&self, syllables: &Arc<[Syllable]>, index: usize) -> RenderResult {
        let engine = Arc::clone(&self.engine);
        let snapshot = Arc::clone(syllables);
        tokio::task::spawn_blocking(move || render_syllable(&*engine, &snapshot[index]))
            .await
            .unwrap_or_else(|e| {
                Err(RenderFailure {
                    syllable: syllables[index].id(),
                    cause: FailureCause::Panicked(e.to_string()),
                })
            })
    }
}

/// Wall-clock length of `samples` at [`TARGET_SAMPLE_RATE`].
pub fn playback_duration(samples: usize) -> Duration {
    Duration::from_secs_f64(samples as f64 / f64::from(TARGET_SAMPLE_RATE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::tests::{syllable, LengthEngine};
    use tokio::time::Instant;

    /// Raises the stop flag as soon as it has played `after` buffers.
    struct StoppingSink {
        inner: CaptureSink,
        stop: StopHandle,
        after: usize,
    }

    impl PlaybackSink for StoppingSink {
        fn play(&self, samples: &[f32], sample_rate: u32) {
            self.inner.play(samples, sample_rate);
            let played = self.inner.played.lock().unwrap().len();
            if played >= self.after {
                self.stop.stop();
            }
        }
    }

    fn scheduler<S: PlaybackSink>(sink: Arc<S>) -> PreviewScheduler<LengthEngine, S> {
        PreviewScheduler::new(Arc::new(LengthEngine), sink, PreviewOptions::default())
    }

    #[test]
    fn playback_duration_matches_sample_count() {
        assert_eq!(playback_duration(44_100), Duration::from_secs(1));
        assert_eq!(playback_duration(882), Duration::from_millis(20));
    }

    #[test]
    fn options_builder_overrides_gap() {
        let options = PreviewOptionsBuilder::default()
            .gap(Duration::from_millis(5))
            .build()
            .unwrap();
        assert_eq!(options.gap, Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn plays_every_syllable_in_order_with_pacing() {
        let sink = Arc::new(CaptureSink::new());
        let preview = scheduler(Arc::clone(&sink));
        let syllables: Arc<[Syllable]> = vec![syllable("441"), syllable("441"), syllable("441")].into();

        let start = Instant::now();
        let mut started = Vec::new();
        let report = preview
            .run(Arc::clone(&syllables), &StopHandle::new(), |e| {
                if let RenderEvent::Started { index, .. } = e {
                    started.push(*index);
                }
            })
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(report.played, 3);
        assert!(!report.cancelled);
        assert_eq!(started, vec![0, 1, 2]);
        assert_eq!(sink.take().iter().map(Vec::len).collect::<Vec<_>>(), vec![882; 3]);
        // 3 × (20 ms of audio + 50 ms gap)
        assert!(elapsed >= Duration::from_millis(210), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(300), "{elapsed:?}");
        assert_eq!(preview.state(), PreviewState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_syllables_are_skipped_but_still_paced() {
        let sink = Arc::new(CaptureSink::new());
        let preview = scheduler(Arc::clone(&sink));
        let syllables: Arc<[Syllable]> = vec![syllable("!"), syllable("10"), syllable("PANIC")].into();

        let start = Instant::now();
        let report = preview
            .run(Arc::clone(&syllables), &StopHandle::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(report.played, 1);
        assert_eq!(report.failed, vec![syllables[0].id(), syllables[2].id()]);
        assert_eq!(sink.take().len(), 1);
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_skips_remaining_syllables_only() {
        let stop = StopHandle::new();
        let sink = Arc::new(StoppingSink {
            inner: CaptureSink::new(),
            stop: stop.clone(),
            after: 2,
        });
        let preview = scheduler(Arc::clone(&sink));
        let syllables: Arc<[Syllable]> = (0..5).map(|_| syllable("100")).collect::<Vec<_>>().into();

        let report = preview.run(syllables, &stop, |_| {}).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.played, 2);
        assert_eq!(sink.inner.take().len(), 2);
        assert_eq!(preview.state().highlighted(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_stop_request_is_cleared_on_start() {
        let stop = StopHandle::new();
        stop.stop();
        let preview = scheduler(Arc::new(NullSink));
        let report = preview
            .run(vec![syllable("10")].into(), &stop, |_| {})
            .await
            .unwrap();
        assert_eq!(report.played, 1);
        assert!(!report.cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn state_follows_the_highlighted_syllable() {
        let preview = Arc::new(scheduler(Arc::new(NullSink)));
        let mut states = preview.subscribe();
        let syllables: Arc<[Syllable]> = vec![syllable("10"), syllable("10")].into();

        let runner = {
            let preview = Arc::clone(&preview);
            tokio::spawn(async move { preview.run(syllables, &StopHandle::new(), |_| {}).await })
        };

        let mut seen = Vec::new();
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            seen.push(state.highlighted());
            if state == PreviewState::Idle {
                break;
            }
        }
        runner.await.unwrap();

        assert_eq!(seen, vec![Some(0), Some(1), None]);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_refused_while_playing() {
        let sink = Arc::new(CaptureSink::new());
        let preview = Arc::new(scheduler(Arc::clone(&sink)));
        let mut states = preview.subscribe();
        let stop = StopHandle::new();
        let syllables: Arc<[Syllable]> = (0..4).map(|_| syllable("4410")).collect::<Vec<_>>().into();

        let runner = {
            let preview = Arc::clone(&preview);
            let stop = stop.clone();
            tokio::spawn(async move { preview.run(syllables, &stop, |_| {}).await })
        };
        states.changed().await.unwrap();
        assert_eq!(preview.state(), PreviewState::Playing { index: 0 });

        let other = StopHandle::new();
        assert_eq!(preview.run(vec![syllable("10")].into(), &other, |_| {}).await, None);
        assert_eq!(preview.run(Vec::<Syllable>::new().into(), &other, |_| {}).await, None);

        stop.stop();
        let report = runner.await.unwrap().unwrap();
        assert!(report.cancelled);
        assert!(report.played < 4);
        assert!(sink.take().iter().all(|buffer| buffer.len() == 8820));
        assert_eq!(preview.state(), PreviewState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_snapshot_is_a_completed_run() {
        let preview = scheduler(Arc::new(NullSink));
        let report = preview
            .run(Vec::<Syllable>::new().into(), &StopHandle::new(), |_| {})
            .await;
        assert_eq!(report, Some(PreviewReport::default()));
        assert_eq!(preview.state(), PreviewState::Idle);
    }
}
