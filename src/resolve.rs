//! Voice parameter resolution.
//!
//! Turns caller-supplied voice defaults (which may be out of range, and may
//! express pitch as a musical note) into the clamped integer [`Voice`] every
//! [`Syllable`] carries.

use std::ops::RangeInclusive;

use derive_builder::Builder;

use crate::syllable::{Note, PitchSource, Syllable, SyllableId, Voice};
use crate::syllabize::syllabize_text;
use crate::NATIVE_SAMPLE_RATE;

pub const PITCH_RANGE: RangeInclusive<i32> = 1..=255;
pub const SPEED_RANGE: RangeInclusive<i32> = 40..=200;
pub const MOUTH_RANGE: RangeInclusive<i32> = 0..=255;
pub const THROAT_RANGE: RangeInclusive<i32> = 0..=255;

pub const DEFAULT_PITCH: i32 = 64;
pub const DEFAULT_SPEED: i32 = 72;
pub const DEFAULT_MOUTH: i32 = 128;
pub const DEFAULT_THROAT: i32 = 128;

/// Voice settings applied to every chunk produced from a piece of text.
///
/// Values are taken as given and clamped only when a syllable is resolved,
/// so a preset file or CLI flag may hold anything.
///
/// ```
/// use bitvox::resolve::VoiceDefaultsBuilder;
/// use bitvox::{Note, PitchSource};
///
/// let defaults = VoiceDefaultsBuilder::default()
///     .pitch(PitchSource::Musical { note: Note::C, octave: 3 })
///     .speed(90)
///     .build()
///     .unwrap();
/// assert_eq!(defaults.mouth, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default)]
pub struct VoiceDefaults {
    pub pitch: PitchSource,
    pub speed: i32,
    pub mouth: i32,
    pub throat: i32,
    /// Treat chunk text as phoneme notation rather than plain text.
    pub phonetic: bool,
}

impl Default for VoiceDefaults {
    fn default() -> Self {
        Self {
            pitch: PitchSource::default(),
            speed: DEFAULT_SPEED,
            mouth: DEFAULT_MOUTH,
            throat: DEFAULT_THROAT,
            phonetic: false,
        }
    }
}

/// Equal-tempered frequency of `note` in `octave`, with A4 = 440 Hz.
pub fn note_frequency(note: Note, octave: u8) -> f64 {
    let semitones = note.index() - 9 + (i32::from(octave) - 4) * 12;
    440.0 * 2f64.powf(f64::from(semitones) / 12.0)
}

/// Engine-native pitch for a note, before clamping.
///
/// The engine's pitch unit is a period in native-rate samples, so the value
/// is `round(native_rate / frequency)`.
pub fn note_to_pitch(note: Note, octave: u8) -> i32 {
    (f64::from(NATIVE_SAMPLE_RATE) / note_frequency(note, octave)).round() as i32
}

fn clamp_to(value: i32, range: &RangeInclusive<i32>) -> u8 {
    value.clamp(*range.start(), *range.end()) as u8
}

pub fn resolve_pitch(source: PitchSource) -> u8 {
    let raw = match source {
        PitchSource::Raw { pitch } => pitch,
        PitchSource::Musical { note, octave } => note_to_pitch(note, octave),
    };
    clamp_to(raw, &PITCH_RANGE)
}

/// Resolve a pitch source and the remaining raw parameters into a [`Voice`].
pub fn resolve_voice(pitch: PitchSource, speed: i32, mouth: i32, throat: i32) -> Voice {
    Voice {
        pitch: resolve_pitch(pitch),
        speed: clamp_to(speed, &SPEED_RANGE),
        mouth: clamp_to(mouth, &MOUTH_RANGE),
        throat: clamp_to(throat, &THROAT_RANGE),
    }
}

/// Build a syllable with a fresh id for one text chunk.
pub fn resolve_syllable(chunk: &str, defaults: &VoiceDefaults) -> Syllable {
    Syllable {
        id: SyllableId::fresh(),
        text: chunk.to_string(),
        phonetic: defaults.phonetic,
        pitch_source: defaults.pitch,
        voice: resolve_voice(
            defaults.pitch,
            defaults.speed,
            defaults.mouth,
            defaults.throat,
        ),
    }
}

/// Syllabize `text` and resolve every chunk against `defaults`.
pub fn syllables_from_text(text: &str, defaults: &VoiceDefaults) -> Vec<Syllable> {
    syllabize_text(text)
        .iter()
        .map(|chunk| resolve_syllable(chunk, defaults))
        .collect()
}
