//! # anki-tts
//!
//! Batch-convert flashcard rows of an XML export into spoken MP3 files.
//!
//! ## Features
//!
//! - **Row extraction**: rows are found by element name anywhere in the document
//! - **Deterministic naming**: `<prefix><id><A-Z>.mp3`, one file per text field
//! - **Pluggable engines**: synthesis and encoding sit behind the [`Synthesizer`]
//!   and [`Encoder`] traits; espeak-ng and LAME back-ends ship with the crate
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! anki-tts = { version = "2026.10", features = ["lame"] }
//! ```
//!
//! ```ignore
//! use anki_tts::config::{ConfigurationBuilder, Mode};
//! use anki_tts::engines::{espeak::EspeakSynthesizer, lame::LameEncoder};
//! use anki_tts::pipeline::{generate, ConsoleProgress};
//!
//! let cfg = ConfigurationBuilder::default()
//!     .mode(Mode::Generate)
//!     .voice("English_(America)")
//!     .source_path("cards.xml")
//!     .text_tags(vec!["Front".to_string(), "Back".to_string()])
//!     .file_prefix("card_")
//!     .dest_dir("out")
//!     .build()?;
//!
//! let mut synth = EspeakSynthesizer::new();
//! let mut encoder = LameEncoder::default();
//! let mut progress = ConsoleProgress::stdout();
//! let report = generate(&cfg, &mut synth, &mut encoder, &mut progress)?;
//! println!("{} files written", report.files.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod engines;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod voices;

use std::io::Cursor;

pub use error::{GeneratorError, Result};

/// Loudest volume accepted by [`Synthesizer::set_volume`].
pub const MAX_VOLUME: u8 = 100;

/// The engine's default speaking rate for [`Synthesizer::set_rate`].
pub const NEUTRAL_RATE: i8 = 0;

/// Rate bounds for [`Synthesizer::set_rate`]; each end is roughly three
/// times slower or faster than [`NEUTRAL_RATE`].
pub const MIN_RATE: i8 = -10;
pub const MAX_RATE: i8 = 10;

/// Raw audio produced by a synthesizer.
///
/// Samples are signed 16-bit PCM, interleaved when `channels > 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Decode a complete WAV stream held in memory.
    ///
    /// A WAV written to a pipe cannot seek back to patch its header, so
    /// the data length is a placeholder (espeak-ng writes `0x7ffff000`).
    /// Samples are read until the bytes run out; a trailing partial frame
    /// is dropped.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let mut wav = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| GeneratorError::Synthesis(format!("invalid WAV stream: {e}")))?;
        let spec = wav.spec();
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(GeneratorError::Synthesis(format!(
                "unsupported WAV format: {:?} {} bits",
                spec.sample_format, spec.bits_per_sample
            )));
        }

        let mut samples = Vec::with_capacity(bytes.len() / 2);
        for sample in wav.samples::<i16>() {
            match sample {
                Ok(s) => samples.push(s),
                // An in-memory reader only fails by running out of bytes.
                Err(hound::Error::IoError(_)) => break,
                Err(e) => {
                    return Err(GeneratorError::Synthesis(format!(
                        "failed to read WAV samples: {e}"
                    )))
                }
            }
        }
        let channels = usize::from(spec.channels.max(1));
        samples.truncate(samples.len() - samples.len() % channels);

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// Encode as an in-memory 16-bit WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| GeneratorError::Encoding(e.to_string()))?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .map_err(|e| GeneratorError::Encoding(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| GeneratorError::Encoding(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// An installed synthesis voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Display name, as printed by the voice listing.
    pub name: String,
    /// Language code the voice speaks (e.g. `en-us`).
    pub language: String,
    /// Engine-specific identifier.
    pub id: String,
}

/// Text-to-speech capability used by the pipeline.
///
/// Implementations hold the selected voice, volume and rate between calls;
/// the pipeline configures them once and then calls [`speak_to_buffer`]
/// for every text field.
///
/// [`speak_to_buffer`]: Synthesizer::speak_to_buffer
pub trait Synthesizer {
    /// Enumerate the voices the engine can use.
    fn voices(&self) -> Result<Vec<VoiceInfo>>;

    /// Make `name` the voice for subsequent synthesis.
    ///
    /// Fails with [`GeneratorError::VoiceNotFound`] when no installed voice
    /// matches.
    fn select_voice(&mut self, name: &str) -> Result<()>;

    /// Volume as a percentage, clamped to `0..=MAX_VOLUME`.
    fn set_volume(&mut self, volume: u8);

    /// Speaking rate, clamped to `MIN_RATE..=MAX_RATE`.
    fn set_rate(&mut self, rate: i8);

    /// Synthesize `text` into an in-memory buffer.
    fn speak_to_buffer(&mut self, text: &str) -> Result<AudioBuffer>;
}

/// MP3 encoding capability used by the pipeline.
pub trait Encoder {
    /// Fails with [`GeneratorError::UnsupportedBitRate`] when the encoder
    /// cannot produce `bit_rate_kbps`. Called once before any synthesis.
    fn check_bit_rate(&self, _bit_rate_kbps: u32) -> Result<()> {
        Ok(())
    }

    /// Encode `audio` as a complete MP3 stream.
    fn encode(&mut self, audio: &AudioBuffer, bit_rate_kbps: u32) -> Result<Vec<u8>>;
}
