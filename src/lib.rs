//! # bitvox
//!
//! Turn short text or phoneme fragments into a fixed-grid sample kit for
//! hardware samplers that slice a file into a multiple of 8 equal pads.
//!
//! ## Pipeline
//!
//! 1. **Syllabize**: text is split into vowel-bounded chunks ([`syllabize`]).
//! 2. **Resolve**: each chunk gets clamped voice parameters ([`resolve`]).
//! 3. **Render**: a [`SpeechEngine`] renders each syllable at its native
//!    rate, which is doubled to [`TARGET_SAMPLE_RATE`] ([`synth`]).
//! 4. **Assemble**: every render goes into its own slot of a uniform length,
//!    padded with silent slots to the next multiple of 8 ([`kit`]).
//! 5. **Encode**: the flat buffer becomes a mono 16-bit WAV ([`wav`]).
//!
//! A syllable that fails to render still keeps its slot; it is silent.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! bitvox = "2026.10"
//! ```
//!
//! ```rust,no_run
//! use bitvox::engines::formant::FormantEngine;
//! use bitvox::export::export_kit;
//! use bitvox::resolve::{syllables_from_text, VoiceDefaults};
//!
//! let syllables = syllables_from_text("saturday banana deluge", &VoiceDefaults::default());
//! let kit = export_kit(&FormantEngine::new(), &syllables)?;
//! println!("{} pads, {} failed", kit.layout.target_slice_count, kit.failed.len());
//! kit.write_to_dir(std::path::Path::new("."))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engines;
pub mod error;
pub mod export;
pub mod kit;
pub mod preview;
pub mod resolve;
pub mod sheet;
pub mod syllabize;
pub mod syllable;
pub mod synth;
pub mod wav;

pub use error::{BitvoxError, EngineError};
pub use syllable::{Note, PitchSource, Syllable, SyllableId, Voice};

/// Rate at which every engine renders.
pub const NATIVE_SAMPLE_RATE: u32 = 22_050;

/// Rate of every buffer past the synthesizer, and of the exported file.
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Sampler bank size; the kit's slot count is always a multiple of this.
pub const SLOTS_PER_BANK: usize = 8;

/// Everything an engine needs to render one syllable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest<'a> {
    pub text: &'a str,
    /// `true` when `text` is phoneme notation, `false` when the engine must
    /// convert graphemes itself.
    pub phonetic: bool,
    pub voice: Voice,
}

impl<'a> From<&'a Syllable> for RenderRequest<'a> {
    fn from(syllable: &'a Syllable) -> Self {
        Self {
            text: syllable.text(),
            phonetic: syllable.is_phonetic(),
            voice: syllable.voice(),
        }
    }
}

/// Common interface for speech synthesis engines.
///
/// An engine is an opaque capability: the pipeline only relies on this
/// contract, never on how the audio is made. Samples are mono, normalized to
/// `[-1.0, 1.0]`, at [`NATIVE_SAMPLE_RATE`].
pub trait SpeechEngine {
    /// Render one syllable at the native rate.
    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<f32>, EngineError>;

    /// Convert plain text to the engine's phoneme notation.
    fn convert_to_phonemes(&self, text: &str) -> Result<String, EngineError>;

    /// Split phoneme notation into one entry per phoneme, keeping any stress
    /// marker with its code.
    ///
    /// The default suits engines whose notation is whitespace separated.
    /// Engines that accept packed notation such as `"SAE"` must override it.
    fn phoneme_codes(&self, notation: &str) -> Result<Vec<String>, EngineError> {
        Ok(notation.split_whitespace().map(str::to_string).collect())
    }
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for std::sync::Arc<E> {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<f32>, EngineError> {
        (**self).render(request)
    }

    fn convert_to_phonemes(&self, text: &str) -> Result<String, EngineError> {
        (**self).convert_to_phonemes(text)
    }

    fn phoneme_codes(&self, notation: &str) -> Result<Vec<String>, EngineError> {
        (**self).phoneme_codes(notation)
    }
}
