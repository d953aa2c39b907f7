//! Dual-formant phoneme synthesizer.
//!
//! A small, dependency-light engine in the spirit of 8-bit speech chips:
//! every phoneme is either a sawtooth glottal pulse shaped by two band-pass
//! formant filters, a burst of high-passed noise, or silence.
//!
//! # Voice Parameters
//!
//! | Parameter | Effect |
//! |---|---|
//! | `pitch` | Glottal period in native-rate samples; lower is higher |
//! | `speed` | Phoneme length; 72 is nominal, higher is slower |
//! | `mouth` | Scales the second formant, 128 is neutral |
//! | `throat` | Scales the first formant, 128 is neutral |
//!
//! # Notation
//!
//! Phoneme text is a run of codes from [`phonemes::PHONEMES`], optionally
//! separated by spaces, each optionally followed by a stress digit 1-8:
//! `"/HEH4LOW"`, `"S AE T ER D EY"`. Plain text is converted letter by letter
//! with [`phonemizer::to_phonemes`].

pub mod dsp;
pub mod engine;
pub mod phonemes;
pub mod phonemizer;

pub use engine::FormantEngine;
