use crate::syllable::SyllableId;

/// Errors reported by a [`SpeechEngine`](crate::SpeechEngine).
///
/// The synthesizer turns every one of these into a
/// [`RenderFailure`](crate::synth::RenderFailure); they never cross the
/// rendering boundary as control flow.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid phoneme {found:?} at position {position}")]
    InvalidPhoneme { position: usize, found: String },
    #[error("Nothing to render")]
    EmptyInput,
    #[error("Grapheme-to-phoneme conversion failed: {0}")]
    Phonemization(String),
    #[error("Engine fault: {0}")]
    Internal(String),
}

#[derive(thiserror::Error, Debug)]
pub enum BitvoxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Invalid voice preset: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Unknown note '{0}'. Expected one of C, C#, D, D#, E, F, F#, G, G#, A, A#, B.")]
    UnknownNote(String),
    #[error("Syllable {0} not found")]
    SyllableNotFound(SyllableId),
    #[error("Phoneme index {index} out of range for syllable {id}")]
    PhonemeIndex { id: SyllableId, index: usize },
    #[error("{syllables} syllables but {results} render results")]
    LengthMismatch { syllables: usize, results: usize },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T, E = BitvoxError> = std::result::Result<T, E>;
