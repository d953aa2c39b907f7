//! The syllable record handed to the synthesizer.
//!
//! A [`Syllable`] always carries a fully resolved [`Voice`]. The
//! [`PitchSource`] it was resolved from is kept alongside so an editor can
//! show the note a pitch came from, but only `voice` is ever read by the
//! rendering pipeline.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::BitvoxError;

/// Opaque per-session syllable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SyllableId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl SyllableId {
    /// Allocate an identifier that has not been handed out in this process.
    pub fn fresh() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SyllableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the 12 equal-tempered pitch classes, starting at C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl Note {
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::CSharp,
        Note::D,
        Note::DSharp,
        Note::E,
        Note::F,
        Note::FSharp,
        Note::G,
        Note::GSharp,
        Note::A,
        Note::ASharp,
        Note::B,
    ];

    /// Position in the chromatic scale, C = 0 .. B = 11.
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::CSharp => "C#",
            Note::D => "D",
            Note::DSharp => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::FSharp => "F#",
            Note::G => "G",
            Note::GSharp => "G#",
            Note::A => "A",
            Note::ASharp => "A#",
            Note::B => "B",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Note {
    type Err = BitvoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Note::ALL
            .iter()
            .copied()
            .find(|n| n.name() == wanted)
            .ok_or_else(|| BitvoxError::UnknownNote(s.to_string()))
    }
}

/// Where a syllable's pitch comes from.
///
/// Exactly one source exists per syllable, so there is never a question of
/// whether a raw pitch or a note takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PitchSource {
    /// Engine-native pitch value, clamped on resolution.
    Raw { pitch: i32 },
    /// Musical note, converted through its equal-tempered frequency.
    Musical { note: Note, octave: u8 },
}

impl Default for PitchSource {
    fn default() -> Self {
        PitchSource::Raw {
            pitch: crate::resolve::DEFAULT_PITCH,
        }
    }
}

/// Resolved voice parameters, each inside its engine range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Voice {
    /// 1–255, lower is higher-pitched.
    pub pitch: u8,
    /// 40–200, higher is slower.
    pub speed: u8,
    /// 0–255.
    pub mouth: u8,
    /// 0–255.
    pub throat: u8,
}

/// A unit of text or phoneme notation plus its resolved voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Syllable {
    pub(crate) id: SyllableId,
    pub(crate) text: String,
    pub(crate) phonetic: bool,
    pub(crate) pitch_source: PitchSource,
    pub(crate) voice: Voice,
}

impl Syllable {
    pub fn id(&self) -> SyllableId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `true` when [`text`](Self::text) is already phoneme notation.
    pub fn is_phonetic(&self) -> bool {
        self.phonetic
    }

    pub fn pitch_source(&self) -> PitchSource {
        self.pitch_source
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }
}
