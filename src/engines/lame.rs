use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm, Quality};

use crate::error::{GeneratorError, Result};
use crate::{AudioBuffer, Encoder};

/// Space LAME asks for when flushing its final frames.
const FLUSH_BUFFER_SIZE: usize = 7200;

/// Constant-bit-rate MP3 encoder backed by libmp3lame.
///
/// A fresh LAME context is built for every buffer, so each call produces a
/// complete, independently playable MP3 stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct LameEncoder;

/// LAME bit rate for `kbps`, if it is one of the standard CBR rates.
pub fn bitrate(kbps: u32) -> Option<Bitrate> {
    let rate = match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        _ => return None,
    };
    Some(rate)
}

fn encoding_error(step: &str, err: impl std::fmt::Debug) -> GeneratorError {
    GeneratorError::Encoding(format!("{step}: {err:?}"))
}

impl Encoder for LameEncoder {
    fn check_bit_rate(&self, bit_rate_kbps: u32) -> Result<()> {
        bitrate(bit_rate_kbps)
            .map(|_| ())
            .ok_or(GeneratorError::UnsupportedBitRate(bit_rate_kbps))
    }

    fn encode(&mut self, audio: &AudioBuffer, bit_rate_kbps: u32) -> Result<Vec<u8>> {
        let brate =
            bitrate(bit_rate_kbps).ok_or(GeneratorError::UnsupportedBitRate(bit_rate_kbps))?;
        let channels = match audio.channels {
            1 | 2 => audio.channels as u8,
            n => {
                return Err(GeneratorError::Encoding(format!(
                    "{n} channels, only mono and stereo are supported"
                )))
            }
        };

        let mut builder = Builder::new()
            .ok_or_else(|| GeneratorError::Encoding("failed to allocate LAME context".into()))?;
        builder
            .set_num_channels(channels)
            .map_err(|e| encoding_error("set channels", e))?;
        builder
            .set_sample_rate(audio.sample_rate)
            .map_err(|e| encoding_error("set sample rate", e))?;
        builder
            .set_brate(brate)
            .map_err(|e| encoding_error("set bit rate", e))?;
        builder
            .set_quality(Quality::Best)
            .map_err(|e| encoding_error("set quality", e))?;
        let mut encoder = builder.build().map_err(|e| encoding_error("build", e))?;

        let mut mp3 = Vec::with_capacity(
            mp3lame_encoder::max_required_buffer_size(audio.frames()) + FLUSH_BUFFER_SIZE,
        );
        let written = if channels == 1 {
            encoder.encode_to_vec(MonoPcm(&audio.samples), &mut mp3)
        } else {
            encoder.encode_to_vec(InterleavedPcm(&audio.samples), &mut mp3)
        }
        .map_err(|e| encoding_error("encode", e))?;
        encoder
            .flush_to_vec::<FlushNoGap>(&mut mp3)
            .map_err(|e| encoding_error("flush", e))?;

        log::debug!(
            "Encoded {} frames into {} bytes ({} before flush) at {} kbps",
            audio.frames(),
            mp3.len(),
            written,
            bit_rate_kbps
        );
        Ok(mp3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(channels: u16) -> AudioBuffer {
        let frames = 22050;
        let samples = (0..frames * channels as usize)
            .map(|i| ((i as f32 * 0.05).sin() * 8000.0) as i16)
            .collect();
        AudioBuffer {
            samples,
            sample_rate: 22050,
            channels,
        }
    }

    #[test]
    fn accepts_standard_rates_only() {
        let encoder = LameEncoder::default();
        assert!(encoder.check_bit_rate(64).is_ok());
        assert!(encoder.check_bit_rate(320).is_ok());
        assert!(matches!(
            encoder.check_bit_rate(65),
            Err(GeneratorError::UnsupportedBitRate(65))
        ));
        assert!(encoder.check_bit_rate(0).is_err());
    }

    #[test]
    fn encodes_mono_to_mp3_frames() {
        let mp3 = LameEncoder::default().encode(&tone(1), 64).unwrap();
        assert!(!mp3.is_empty());
        // MPEG audio frame sync: 11 set bits.
        assert!(mp3
            .windows(2)
            .any(|w| w[0] == 0xFF && (w[1] & 0xE0) == 0xE0));
    }

    #[test]
    fn encodes_interleaved_stereo() {
        let mp3 = LameEncoder::default().encode(&tone(2), 128).unwrap();
        assert!(!mp3.is_empty());
    }

    #[test]
    fn higher_bit_rate_gives_larger_output() {
        let mut encoder = LameEncoder::default();
        let low = encoder.encode(&tone(1), 32).unwrap();
        let high = encoder.encode(&tone(1), 128).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn rejects_more_than_two_channels() {
        let audio = AudioBuffer {
            samples: vec![0; 30],
            sample_rate: 22050,
            channels: 3,
        };
        assert!(matches!(
            LameEncoder::default().encode(&audio, 64),
            Err(GeneratorError::Encoding(_))
        ));
    }
}
