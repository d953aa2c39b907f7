use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::EngineError;
use crate::resolve::{DEFAULT_MOUTH, DEFAULT_SPEED, DEFAULT_THROAT};
use crate::syllable::Voice;
use crate::{RenderRequest, SpeechEngine, NATIVE_SAMPLE_RATE};

use super::dsp::{Biquad, Envelope, Sawtooth};
use super::phonemes::{parse_phonemes, Articulation, Phoneme};
use super::phonemizer::to_phonemes;

const DEFAULT_SEED: u64 = 0xB17_B0C5;

const ATTACK_SECS: f32 = 0.01;
const DECAY_FLOOR: f32 = 0.001;
const VOICED_PEAK: f32 = 0.3;
const NOISE_PEAK: f32 = 0.1;
const F1_Q: f32 = 5.0;
const F2_Q: f32 = 8.0;
const NOISE_CUTOFF_HZ: f32 = 2000.0;
const NOISE_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Dual-formant phoneme synthesizer.
///
/// Voiced phonemes run a sawtooth at `22050 / pitch` Hz through two parallel
/// band-pass filters; unvoiced ones are high-passed noise. Noise is seeded,
/// so the same request always renders the same samples.
///
/// ```rust
/// use bitvox::engines::formant::FormantEngine;
/// use bitvox::{RenderRequest, SpeechEngine, Voice};
///
/// let engine = FormantEngine::new();
/// let samples = engine.render(&RenderRequest {
///     text: "S AE",
///     phonetic: true,
///     voice: Voice { pitch: 64, speed: 72, mouth: 128, throat: 128 },
/// })?;
/// assert!(!samples.is_empty());
/// # Ok::<(), bitvox::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FormantEngine {
    seed: u64,
}

impl Default for FormantEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FormantEngine {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Use a different noise seed. Output is still deterministic per seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    fn synthesize(&self, phonemes: &[Phoneme], voice: Voice) -> Vec<f32> {
        let sample_rate = NATIVE_SAMPLE_RATE as f32;
        let f0 = sample_rate / f32::from(voice.pitch.max(1));
        let time_scale = f32::from(voice.speed) / DEFAULT_SPEED as f32;
        let f1_scale = 0.5 + f32::from(voice.throat) / (2 * DEFAULT_THROAT) as f32;
        let f2_scale = 0.5 + f32::from(voice.mouth) / (2 * DEFAULT_MOUTH) as f32;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut glottis = Sawtooth::default();
        let mut out = Vec::new();

        for phoneme in phonemes {
            let duration = phoneme.nominal_duration() * time_scale;
            let len = (duration * sample_rate).round() as usize;

            match phoneme.articulation() {
                Articulation::Pause => out.extend(std::iter::repeat(0.0).take(len)),
                Articulation::Voiced { f1, f2 } => {
                    let env = Envelope {
                        peak: VOICED_PEAK,
                        attack: ATTACK_SECS,
                        floor: DECAY_FLOOR,
                    };
                    let mut bp1 = Biquad::band_pass(f1 * f1_scale, F1_Q, sample_rate);
                    let mut bp2 = Biquad::band_pass(f2 * f2_scale, F2_Q, sample_rate);
                    for n in 0..len {
                        let source = glottis.next(f0, sample_rate);
                        let shaped = bp1.process(source) + bp2.process(source);
                        out.push(shaped * env.gain(n as f32 / sample_rate, duration));
                    }
                }
                Articulation::Noise => {
                    let env = Envelope {
                        peak: NOISE_PEAK,
                        attack: ATTACK_SECS,
                        floor: DECAY_FLOOR,
                    };
                    let mut hp = Biquad::high_pass(NOISE_CUTOFF_HZ, NOISE_Q, sample_rate);
                    for n in 0..len {
                        let white: f32 = rng.gen_range(-1.0..1.0);
                        out.push(hp.process(white) * env.gain(n as f32 / sample_rate, duration));
                    }
                }
            }
        }

        for s in &mut out {
            *s = s.clamp(-1.0, 1.0);
        }
        out
    }
}

impl SpeechEngine for FormantEngine {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<f32>, EngineError> {
        let phonemes = if request.phonetic {
            parse_phonemes(request.text)?
        } else {
            parse_phonemes(&to_phonemes(request.text)?)?
        };
        if phonemes.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        log::debug!(
            "Rendering {} phonemes at pitch {} speed {}",
            phonemes.len(),
            request.voice.pitch,
            request.voice.speed
        );
        Ok(self.synthesize(&phonemes, request.voice))
    }

    fn convert_to_phonemes(&self, text: &str) -> Result<String, EngineError> {
        to_phonemes(text)
    }

    fn phoneme_codes(&self, notation: &str) -> Result<Vec<String>, EngineError> {
        Ok(parse_phonemes(notation)?
            .iter()
            .map(Phoneme::notation)
            .collect())
    }
}
