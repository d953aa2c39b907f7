//! JSON voice presets.
//!
//! ```json
//! { "note": "C#", "octave": 3, "speed": 90, "phonetic": true }
//! ```
//!
//! Every field is optional. A preset names its pitch either as a raw
//! `pitch` or as a `note` (with an optional `octave`, default 4); when both
//! are present the note wins.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::resolve::VoiceDefaults;
use crate::syllable::{Note, PitchSource};

const DEFAULT_OCTAVE: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoicePreset {
    pub pitch: Option<i32>,
    pub note: Option<Note>,
    pub octave: Option<u8>,
    pub speed: Option<i32>,
    pub mouth: Option<i32>,
    pub throat: Option<i32>,
    pub phonetic: Option<bool>,
}

impl VoicePreset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let preset = Self::from_json(&content)?;
        log::debug!("Loaded voice preset from {}", path.display());
        Ok(preset)
    }

    /// Overlay the fields this preset sets onto `base`.
    pub fn apply_to(&self, base: VoiceDefaults) -> VoiceDefaults {
        let pitch = match (self.note, self.pitch) {
            (Some(note), _) => PitchSource::Musical {
                note,
                octave: self.octave.unwrap_or(DEFAULT_OCTAVE),
            },
            (None, Some(pitch)) => PitchSource::Raw { pitch },
            (None, None) => base.pitch,
        };
        VoiceDefaults {
            pitch,
            speed: self.speed.unwrap_or(base.speed),
            mouth: self.mouth.unwrap_or(base.mouth),
            throat: self.throat.unwrap_or(base.throat),
            phonetic: self.phonetic.unwrap_or(base.phonetic),
        }
    }
}

impl From<VoicePreset> for VoiceDefaults {
    fn from(preset: VoicePreset) -> Self {
        preset.apply_to(VoiceDefaults::default())
    }
}

/// Read a preset file into complete voice defaults.
pub fn load_voice_defaults(path: &Path) -> Result<VoiceDefaults> {
    VoicePreset::load(path).map(VoiceDefaults::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BitvoxError;
    use crate::resolve::{DEFAULT_MOUTH, DEFAULT_SPEED, DEFAULT_THROAT};
    use std::io::Write;

    #[test]
    fn empty_preset_is_the_default_voice() {
        let defaults = VoiceDefaults::from(VoicePreset::from_json("{}").unwrap());
        assert_eq!(defaults, VoiceDefaults::default());
    }

    #[test]
    fn raw_pitch_with_partial_fields() {
        let defaults: VoiceDefaults = VoicePreset::from_json(r#"{"pitch": 100, "mouth": 40}"#)
            .unwrap()
            .into();
        assert_eq!(defaults.pitch, PitchSource::Raw { pitch: 100 });
        assert_eq!(defaults.mouth, 40);
        assert_eq!(defaults.speed, DEFAULT_SPEED);
        assert_eq!(defaults.throat, DEFAULT_THROAT);
        assert!(!defaults.phonetic);
    }

    #[test]
    fn note_takes_precedence_and_octave_defaults_to_4() {
        let defaults: VoiceDefaults =
            VoicePreset::from_json(r#"{"pitch": 10, "note": "C#", "phonetic": true}"#)
                .unwrap()
                .into();
        assert_eq!(
            defaults.pitch,
            PitchSource::Musical {
                note: Note::CSharp,
                octave: 4
            }
        );
        assert!(defaults.phonetic);
    }

    #[test]
    fn out_of_range_values_are_kept_for_later_clamping() {
        let defaults: VoiceDefaults = VoicePreset::from_json(r#"{"speed": 9000, "mouth": -3}"#)
            .unwrap()
            .into();
        assert_eq!(defaults.speed, 9000);
        assert_eq!(defaults.mouth, -3);
    }

    #[test]
    fn preset_overlays_an_existing_voice() {
        let base = VoiceDefaults {
            mouth: 10,
            ..VoiceDefaults::default()
        };
        let merged = VoicePreset::from_json(r#"{"throat": 200}"#)
            .unwrap()
            .apply_to(base);
        assert_eq!(merged.mouth, 10);
        assert_eq!(merged.throat, 200);
        assert_ne!(merged.mouth, DEFAULT_MOUTH);
    }

    #[test]
    fn bad_documents_are_config_errors() {
        for json in [r#"{"note": "H"}"#, r#"{"volume": 3}"#, "not json"] {
            assert!(
                matches!(VoicePreset::from_json(json), Err(BitvoxError::Config(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"note": "A", "octave": 3, "speed": 100}}"#).unwrap();
        let defaults = load_voice_defaults(file.path()).unwrap();
        assert_eq!(
            defaults.pitch,
            PitchSource::Musical {
                note: Note::A,
                octave: 3
            }
        );
        assert_eq!(defaults.speed, 100);

        assert!(matches!(
            load_voice_defaults(Path::new("/nonexistent/voice.json")),
            Err(BitvoxError::Io(_))
        ));
    }
}
