//! Per-syllable rendering.
//!
//! This is the boundary past which engine failures are data: every call
//! returns a [`RenderResult`], whether the engine rejected its input,
//! produced garbage, or panicked.

use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use crate::error::EngineError;
use crate::syllable::{Syllable, SyllableId};
use crate::{RenderRequest, SpeechEngine, NATIVE_SAMPLE_RATE, TARGET_SAMPLE_RATE};

/// Samples at [`TARGET_SAMPLE_RATE`], or the reason there are none.
pub type RenderResult = Result<Vec<f32>, RenderFailure>;

/// Why a syllable produced no audio.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// The engine returned an error, e.g. invalid phoneme notation.
    Rejected(EngineError),
    /// The engine panicked while rendering.
    Panicked(String),
    /// The engine returned NaN or infinite samples.
    NonFinite { index: usize },
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Rejected(e) => write!(f, "{e}"),
            FailureCause::Panicked(msg) => write!(f, "engine panicked: {msg}"),
            FailureCause::NonFinite { index } => {
                write!(f, "engine produced a non-finite sample at {index}")
            }
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Syllable {syllable} failed to render: {cause}")]
pub struct RenderFailure {
    pub syllable: SyllableId,
    pub cause: FailureCause,
}

/// Progress notifications for whoever is presenting a render batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Started { index: usize, syllable: SyllableId },
    Completed { index: usize, syllable: SyllableId, samples: usize },
    Failed { index: usize, failure: RenderFailure },
}

/// Double the sample rate by emitting every sample twice.
///
/// No interpolation: the stepped waveform is part of the sound.
pub fn upsample_2x(input: &[f32]) -> Vec<f32> {
    debug_assert_eq!(TARGET_SAMPLE_RATE, NATIVE_SAMPLE_RATE * 2);
    let mut output = Vec::with_capacity(input.len() * 2);
    for &s in input {
        output.push(s);
        output.push(s);
    }
    output
}

thread_local! {
    static IN_ENGINE: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wrap the process panic hook so that panics raised inside an engine call
/// are logged at debug level instead of printed. Panics anywhere else still
/// reach the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_ENGINE.with(Cell::get) {
                log::debug!("Engine panicked: {info}");
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `f` with engine panics silenced on this thread.
fn quietly<T>(f: impl FnOnce() -> T) -> std::thread::Result<T> {
    install_quiet_hook();
    let outer = IN_ENGINE.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    IN_ENGINE.with(|flag| flag.set(outer));
    result
}

/// Render one syllable and bring it to [`TARGET_SAMPLE_RATE`].
///
/// An engine panic is caught and reported as [`FailureCause::Panicked`]; it
/// goes to the `log` facade at debug level rather than to stderr.
pub fn render_syllable<E: SpeechEngine + ?Sized>(engine: &E, syllable: &Syllable) -> RenderResult {
    let request = RenderRequest::from(syllable);
    let fail = |cause| RenderFailure {
        syllable: syllable.id(),
        cause,
    };

    let native = match quietly(|| engine.render(&request)) {
        Ok(Ok(samples)) => samples,
        Ok(Err(e)) => return Err(fail(FailureCause::Rejected(e))),
        Err(payload) => return Err(fail(FailureCause::Panicked(panic_message(&*payload)))),
    };

    if let Some(index) = native.iter().position(|s| !s.is_finite()) {
        return Err(fail(FailureCause::NonFinite { index }));
    }

    Ok(upsample_2x(&native))
}

/// Render every syllable in order, reporting progress to `observer`.
///
/// Failures never stop the batch; the returned list always has one entry
/// per syllable, at the syllable's index.
pub fn render_all<E, F>(engine: &E, syllables: &[Syllable], mut observer: F) -> Vec<RenderResult>
where
    E: SpeechEngine + ?Sized,
    F: FnMut(&RenderEvent),
{
    let mut results = Vec::with_capacity(syllables.len());
    for (index, syllable) in syllables.iter().enumerate() {
        observer(&RenderEvent::Started {
            index,
            syllable: syllable.id(),
        });

        let result = render_syllable(engine, syllable);
        match &result {
            Ok(samples) => {
                log::debug!(
                    "Rendered {} {:?}: {} samples",
                    syllable.id(),
                    syllable.text(),
                    samples.len()
                );
                observer(&RenderEvent::Completed {
                    index,
                    syllable: syllable.id(),
                    samples: samples.len(),
                });
            }
            Err(failure) => {
                log::warn!("{failure}");
                observer(&RenderEvent::Failed {
                    index,
                    failure: failure.clone(),
                });
            }
        }
        results.push(result);
    }
    results
}

/// Ids of every failed render, in presentation order.
pub fn failed_ids(results: &[RenderResult]) -> Vec<SyllableId> {
    results
        .iter()
        .filter_map(|r| r.as_ref().err().map(|f| f.syllable))
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
