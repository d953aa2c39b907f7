//! The "export" command: syllables in, WAV bytes out.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::kit::{assemble, KitLayout};
use crate::synth::{render_all, RenderEvent};
use crate::syllable::{Syllable, SyllableId};
use crate::wav::encode_wav;
use crate::{SpeechEngine, TARGET_SAMPLE_RATE};

const SLUG_MAX_CHARS: usize = 32;

/// A rendered kit, ready to be saved.
#[derive(Debug, Clone)]
pub struct KitExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub layout: KitLayout,
    /// Syllables whose slot is silent because they failed to render.
    pub failed: Vec<SyllableId>,
}

impl KitExport {
    /// Write the kit into `dir` under its [`file_name`](Self::file_name).
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// Render, assemble and encode a kit.
///
/// Individual render failures are reported in [`KitExport::failed`]; the
/// export itself still succeeds.
pub fn export_kit<E: SpeechEngine + ?Sized>(engine: &E, syllables: &[Syllable]) -> Result<KitExport> {
    export_kit_with(engine, syllables, |_| {})
}

/// [`export_kit`], reporting per-syllable progress to `observer`.
pub fn export_kit_with<E, F>(engine: &E, syllables: &[Syllable], observer: F) -> Result<KitExport>
where
    E: SpeechEngine + ?Sized,
    F: FnMut(&RenderEvent),
{
    log::info!("Exporting {} syllables", syllables.len());
    let results = render_all(engine, syllables, observer);
    let kit = assemble(syllables, &results)?;
    let bytes = encode_wav(&kit.samples, TARGET_SAMPLE_RATE)?;

    Ok(KitExport {
        file_name: kit_file_name(syllables, &kit.layout),
        bytes,
        layout: kit.layout,
        failed: kit.failed,
    })
}

/// `bitvox_<slug>_<active>syl_<target>pad.wav`.
pub fn kit_file_name(syllables: &[Syllable], layout: &KitLayout) -> String {
    format!(
        "bitvox_{}_{}syl_{}pad.wav",
        slug(syllables),
        layout.active_count,
        layout.target_slice_count
    )
}

fn slug(syllables: &[Syllable]) -> String {
    let joined = syllables
        .iter()
        .map(|s| {
            s.text()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let truncated: String = joined.chars().take(SLUG_MAX_CHARS).collect();
    let trimmed = truncated.trim_end_matches('-');
    if trimmed.is_empty() {
        "kit".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::tests::{syllable, LengthEngine};
    use crate::wav::HEADER_LEN;

    #[test]
    fn export_covers_every_slot() {
        let syllables = vec![syllable("50"), syllable("75"), syllable("40")];
        let kit = export_kit(&LengthEngine, &syllables).unwrap();

        assert_eq!(kit.layout.slice_duration_samples, 150);
        assert_eq!(kit.layout.target_slice_count, 8);
        assert_eq!(kit.bytes.len(), HEADER_LEN + 1200 * 2);
        assert!(kit.failed.is_empty());
    }

    #[test]
    fn failures_are_reported_without_aborting() {
        let syllables = vec![syllable("!"), syllable("PANIC")];
        let kit = export_kit(&LengthEngine, &syllables).unwrap();

        assert_eq!(kit.failed, vec![syllables[0].id(), syllables[1].id()]);
        assert_eq!(kit.layout.slice_duration_samples, 1);
        assert_eq!(kit.bytes.len(), HEADER_LEN + 8 * 2);
        assert!(kit.bytes[HEADER_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn export_is_deterministic() {
        let syllables = vec![syllable("12"), syllable("30")];
        let first = export_kit(&LengthEngine, &syllables).unwrap();
        let second = export_kit(&LengthEngine, &syllables).unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.file_name, second.file_name);
    }

    #[test]
    fn file_name_reflects_text_and_counts() {
        let syllables = vec![syllable("SA"), syllable("TUR"), syllable("DAY")];
        let layout = KitLayout::new(3, 100);
        assert_eq!(
            kit_file_name(&syllables, &layout),
            "bitvox_sa-tur-day_3syl_8pad.wav"
        );
        assert_eq!(
            kit_file_name(&[], &KitLayout::new(0, 0)),
            "bitvox_kit_0syl_8pad.wav"
        );
    }

    #[test]
    fn long_slugs_are_truncated() {
        let syllables: Vec<_> = (0..20).map(|_| syllable("BA")).collect();
        let name = kit_file_name(&syllables, &KitLayout::new(20, 1));
        let slug = name
            .strip_prefix("bitvox_")
            .and_then(|n| n.strip_suffix("_20syl_24pad.wav"))
            .unwrap();
        assert!(slug.len() <= SLUG_MAX_CHARS);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let kit = export_kit(&LengthEngine, &[syllable("8")]).unwrap();
        let path = kit.write_to_dir(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "bitvox_8_1syl_8pad.wav");
        assert_eq!(std::fs::read(path).unwrap(), kit.bytes);
    }
}
