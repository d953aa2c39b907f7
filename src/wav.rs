//! Mono 16-bit PCM WAV encoding.
//!
//! Output is the canonical 44-byte header followed by little-endian samples.
//! Float samples are clamped to `[-1, 1]` and scaled by 32768 when negative
//! and 32767 otherwise, truncating toward zero, so `1.0` and `-1.0` land
//! exactly on `i16::MAX` and `i16::MIN`.

use std::io::Cursor;
use std::path::Path;

use crate::error::Result;

pub const HEADER_LEN: usize = 44;

fn spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Convert one normalized sample to 16-bit PCM.
///
/// # Panics
///
/// On NaN. Rendering rejects non-finite engine output, so a NaN here is a
/// broken invariant rather than bad input.
pub fn float_to_pcm16(sample: f32) -> i16 {
    assert!(!sample.is_nan(), "NaN sample reached the WAV encoder");
    let s = f64::from(sample.clamp(-1.0, 1.0));
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode `samples` as a complete WAV file in memory.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec(sample_rate))?;
        for &s in samples {
            writer.write_sample(float_to_pcm16(s))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Encode `samples` and write them to `path`.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let bytes = encode_wav(samples, sample_rate)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn header_layout_is_canonical() {
        let bytes = encode_wav(&[1.0, -1.0], 44_100).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + 4);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + 4);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1);
        assert_eq!(u16_at(&bytes, 22), 1);
        assert_eq!(u32_at(&bytes, 24), 44_100);
        assert_eq!(u32_at(&bytes, 28), 88_200);
        assert_eq!(u16_at(&bytes, 32), 2);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 4);
        assert_eq!(&bytes[44..46], &[0xFF, 0x7F]);
        assert_eq!(&bytes[46..48], &[0x00, 0x80]);
    }

    #[test]
    fn scaling_is_asymmetric_and_truncating() {
        assert_eq!(float_to_pcm16(1.0), 32767);
        assert_eq!(float_to_pcm16(-1.0), -32768);
        assert_eq!(float_to_pcm16(0.0), 0);
        assert_eq!(float_to_pcm16(0.5), 16383);
        assert_eq!(float_to_pcm16(-0.5), -16384);
        // 0.99999 * 32767 = 32766.67, truncated rather than rounded
        assert_eq!(float_to_pcm16(0.99999), 32766);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        assert_eq!(float_to_pcm16(3.5), 32767);
        assert_eq!(float_to_pcm16(-7.0), -32768);
        assert_eq!(float_to_pcm16(f32::INFINITY), 32767);
    }

    #[test]
    #[should_panic(expected = "NaN")]
    fn nan_is_an_invariant_violation() {
        float_to_pcm16(f32::NAN);
    }

    #[test]
    fn empty_buffer_is_a_bare_header() {
        let bytes = encode_wav(&[], 44_100).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(u32_at(&bytes, 4), 36);
        assert_eq!(u32_at(&bytes, 40), 0);
    }

    #[test]
    fn output_decodes_with_hound() {
        let samples = [0.0, 0.25, -0.25, 1.0, -1.0];
        let bytes = encode_wav(&samples, 44_100).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec(), spec(44_100));
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0, 8191, -8192, 32767, -32768]);
    }

    #[test]
    fn write_wav_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.wav");
        write_wav(&path, &[0.5; 10], 44_100).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 20);
    }
}
