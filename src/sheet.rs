//! An editable, ordered list of syllables.
//!
//! The sheet is only mutated between operations. Preview and export work on
//! a [`snapshot`](SyllableSheet::snapshot), so edits made while a render is
//! in flight never shift the indices it is using.

use std::sync::Arc;

use crate::error::{BitvoxError, EngineError, Result};
use crate::kit::KitLayout;
use crate::resolve::{resolve_syllable, resolve_voice, syllables_from_text, VoiceDefaults};
use crate::syllable::{PitchSource, Syllable, SyllableId};
use crate::SpeechEngine;

/// A single change to one syllable. The voice is re-resolved after every edit.
#[derive(Debug, Clone, PartialEq)]
pub enum SyllableEdit {
    Text(String),
    Phonetic(bool),
    Pitch(PitchSource),
    Speed(i32),
    Mouth(i32),
    Throat(i32),
}

/// Slot statistics for the sheet as it stands, without rendering anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPreview {
    pub active_count: usize,
    pub target_slice_count: usize,
    pub padding_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SyllableSheet {
    syllables: Vec<Syllable>,
    defaults: VoiceDefaults,
    /// Unclamped speed/mouth/throat per syllable, so repeated edits don't
    /// compound clamping.
    raw: Vec<RawVoice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawVoice {
    speed: i32,
    mouth: i32,
    throat: i32,
}

impl RawVoice {
    fn from_defaults(defaults: &VoiceDefaults) -> Self {
        Self {
            speed: defaults.speed,
            mouth: defaults.mouth,
            throat: defaults.throat,
        }
    }
}

impl SyllableSheet {
    pub fn new(defaults: VoiceDefaults) -> Self {
        Self {
            syllables: Vec::new(),
            defaults,
            raw: Vec::new(),
        }
    }

    pub fn defaults(&self) -> &VoiceDefaults {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: VoiceDefaults) {
        self.defaults = defaults;
    }

    pub fn syllables(&self) -> &[Syllable] {
        &self.syllables
    }

    pub fn len(&self) -> usize {
        self.syllables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syllables.is_empty()
    }

    pub fn get(&self, id: SyllableId) -> Option<&Syllable> {
        self.syllables.iter().find(|s| s.id == id)
    }

    /// Replace the sheet with the syllables of `text`.
    ///
    /// Text that yields no chunks leaves the sheet untouched. Returns the
    /// number of syllables generated.
    pub fn generate_from_text(&mut self, text: &str) -> usize {
        let generated = syllables_from_text(text, &self.defaults);
        if generated.is_empty() {
            log::debug!("No syllables in {text:?}, keeping current sheet");
            return 0;
        }
        log::info!("Generated {} syllables from text", generated.len());
        self.raw = vec![RawVoice::from_defaults(&self.defaults); generated.len()];
        self.syllables = generated;
        self.syllables.len()
    }

    /// Append a syllable built from the sheet defaults.
    pub fn push(&mut self, text: &str) -> SyllableId {
        let syllable = resolve_syllable(text, &self.defaults);
        let id = syllable.id;
        self.syllables.push(syllable);
        self.raw.push(RawVoice::from_defaults(&self.defaults));
        id
    }

    pub fn remove(&mut self, id: SyllableId) -> Result<Syllable> {
        let index = self.index_of(id)?;
        self.raw.remove(index);
        Ok(self.syllables.remove(index))
    }

    pub fn update(&mut self, id: SyllableId, edit: SyllableEdit) -> Result<&Syllable> {
        let index = self.index_of(id)?;
        let raw = &mut self.raw[index];
        let syllable = &mut self.syllables[index];
        match edit {
            SyllableEdit::Text(text) => syllable.text = text,
            SyllableEdit::Phonetic(phonetic) => syllable.phonetic = phonetic,
            SyllableEdit::Pitch(source) => syllable.pitch_source = source,
            SyllableEdit::Speed(speed) => raw.speed = speed,
            SyllableEdit::Mouth(mouth) => raw.mouth = mouth,
            SyllableEdit::Throat(throat) => raw.throat = throat,
        }
        syllable.voice = resolve_voice(syllable.pitch_source, raw.speed, raw.mouth, raw.throat);
        Ok(syllable)
    }

    /// Append phoneme `code` to a syllable, switching it to phoneme notation.
    ///
    /// A syllable that still holds plain text starts over from an empty
    /// phoneme list. The syllable is rewritten as space-separated codes, as
    /// split by `engine`.
    pub fn append_phoneme<E: SpeechEngine + ?Sized>(
        &mut self,
        id: SyllableId,
        code: &str,
        engine: &E,
    ) -> Result<&Syllable> {
        let index = self.index_of(id)?;
        let added = engine.phoneme_codes(code)?;
        if added.is_empty() {
            return Err(EngineError::EmptyInput.into());
        }

        let syllable = &mut self.syllables[index];
        let mut phonemes = if syllable.phonetic {
            engine.phoneme_codes(&syllable.text)?
        } else {
            Vec::new()
        };
        phonemes.extend(added);
        syllable.text = phonemes.join(" ");
        syllable.phonetic = true;
        Ok(syllable)
    }

    /// Remove the phoneme at `position` from a phonetic syllable.
    ///
    /// Positions count phonemes as `engine` reads them, so packed notation
    /// such as `"SAE"` holds two.
    pub fn remove_phoneme<E: SpeechEngine + ?Sized>(
        &mut self,
        id: SyllableId,
        position: usize,
        engine: &E,
    ) -> Result<&Syllable> {
        let index = self.index_of(id)?;
        let syllable = &mut self.syllables[index];
        if !syllable.phonetic {
            return Err(BitvoxError::PhonemeIndex {
                id,
                index: position,
            });
        }
        let mut phonemes = engine.phoneme_codes(&syllable.text)?;
        if position >= phonemes.len() {
            return Err(BitvoxError::PhonemeIndex {
                id,
                index: position,
            });
        }
        phonemes.remove(position);
        syllable.text = phonemes.join(" ");
        Ok(syllable)
    }

    /// Replace a syllable's text with the engine's phoneme notation for it.
    pub fn convert_to_phonemes<E: SpeechEngine + ?Sized>(
        &mut self,
        id: SyllableId,
        engine: &E,
    ) -> Result<&Syllable> {
        let index = self.index_of(id)?;
        let syllable = &mut self.syllables[index];
        if !syllable.phonetic {
            syllable.text = engine.convert_to_phonemes(&syllable.text)?;
            syllable.phonetic = true;
        }
        Ok(syllable)
    }

    /// Immutable copy of the current list for a preview or export.
    pub fn snapshot(&self) -> Arc<[Syllable]> {
        Arc::from(self.syllables.as_slice())
    }

    pub fn layout_preview(&self) -> LayoutPreview {
        let layout = KitLayout::new(self.syllables.len(), 0);
        LayoutPreview {
            active_count: layout.active_count,
            target_slice_count: layout.target_slice_count,
            padding_count: layout.padding_count(),
        }
    }

    fn index_of(&self, id: SyllableId) -> Result<usize> {
        self.syllables
            .iter()
            .position(|s| s.id == id)
            .ok_or(BitvoxError::SyllableNotFound(id))
    }
}
