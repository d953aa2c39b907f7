//! Speech synthesis engines.
//!
//! This module contains implementations of [`SpeechEngine`](crate::SpeechEngine).
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `formant` - dual-formant phoneme synthesizer (default, pure Rust)

#[cfg(feature = "formant")]
pub mod formant;
