//! Kit assembly: uniform slots, padded to a full sampler bank.
//!
//! Every syllable gets a slot as long as the longest render in the batch.
//! Its samples sit at the start of the slot and the rest is silence. Slots
//! past the last syllable, up to the next multiple of
//! [`SLOTS_PER_BANK`], are silent too.

use crate::error::{BitvoxError, Result};
use crate::synth::{failed_ids, RenderResult};
use crate::syllable::{Syllable, SyllableId};
use crate::SLOTS_PER_BANK;

/// Slot geometry for one batch of renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KitLayout {
    /// Length of every slot, in samples. Never 0.
    pub slice_duration_samples: usize,
    /// Number of syllables, each owning one slot.
    pub active_count: usize,
    /// Total slot count, a multiple of [`SLOTS_PER_BANK`].
    pub target_slice_count: usize,
}

/// Next multiple of [`SLOTS_PER_BANK`] at or above `active_count`, never
/// less than one full bank.
pub fn target_slice_count(active_count: usize) -> usize {
    active_count.max(1).div_ceil(SLOTS_PER_BANK) * SLOTS_PER_BANK
}

impl KitLayout {
    /// Layout for a batch of render results. Failed renders count as empty.
    pub fn from_results(results: &[RenderResult]) -> Self {
        let longest = results
            .iter()
            .map(|r| r.as_ref().map_or(0, Vec::len))
            .max()
            .unwrap_or(0);
        Self::new(results.len(), longest)
    }

    /// Layout for `active_count` slots whose longest render is
    /// `longest_samples` long.
    pub fn new(active_count: usize, longest_samples: usize) -> Self {
        Self {
            slice_duration_samples: longest_samples.max(1),
            active_count,
            target_slice_count: target_slice_count(active_count),
        }
    }

    /// Silent slots appended after the last syllable.
    pub fn padding_count(&self) -> usize {
        self.target_slice_count - self.active_count
    }

    /// Length of the flat kit buffer.
    pub fn total_samples(&self) -> usize {
        self.target_slice_count * self.slice_duration_samples
    }

    /// Offset of slot `index` in the flat buffer.
    pub fn slot_offset(&self, index: usize) -> usize {
        index * self.slice_duration_samples
    }
}

/// The flat kit: `target_slice_count` equal slots back to back.
#[derive(Debug, Clone, PartialEq)]
pub struct KitBuffer {
    pub layout: KitLayout,
    pub samples: Vec<f32>,
    /// Syllables whose slot is silent because they failed to render.
    pub failed: Vec<SyllableId>,
}

impl KitBuffer {
    /// Samples of slot `index`, or `None` past the last slot.
    pub fn slot(&self, index: usize) -> Option<&[f32]> {
        if index >= self.layout.target_slice_count {
            return None;
        }
        let start = self.layout.slot_offset(index);
        Some(&self.samples[start..start + self.layout.slice_duration_samples])
    }
}

/// Place each render in its syllable's slot.
///
/// `results[i]` must be the render of `syllables[i]`.
pub fn assemble(syllables: &[Syllable], results: &[RenderResult]) -> Result<KitBuffer> {
    if syllables.len() != results.len() {
        return Err(BitvoxError::LengthMismatch {
            syllables: syllables.len(),
            results: results.len(),
        });
    }

    let layout = KitLayout::from_results(results);
    let mut samples = vec![0.0f32; layout.total_samples()];

    for (index, result) in results.iter().enumerate() {
        let Ok(rendered) = result else { continue };
        assert!(
            rendered.len() <= layout.slice_duration_samples,
            "render of {} samples overflows a {}-sample slot",
            rendered.len(),
            layout.slice_duration_samples
        );
        let start = layout.slot_offset(index);
        samples[start..start + rendered.len()].copy_from_slice(rendered);
    }

    let failed = failed_ids(results);
    log::info!(
        "Assembled kit: {} syllables ({} failed) in {} slots of {} samples",
        layout.active_count,
        failed.len(),
        layout.target_slice_count,
        layout.slice_duration_samples
    );

    Ok(KitBuffer {
        layout,
        samples,
        failed,
    })
}
