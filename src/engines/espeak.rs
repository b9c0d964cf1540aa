use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::config::Configuration;
use crate::error::{GeneratorError, Result};
use crate::{AudioBuffer, Synthesizer, VoiceInfo, MAX_RATE, MAX_VOLUME, MIN_RATE, NEUTRAL_RATE};

/// espeak-ng's own default speed, used for [`NEUTRAL_RATE`].
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 175;
const MIN_WORDS_PER_MINUTE: u32 = 80;
const MAX_WORDS_PER_MINUTE: u32 = 450;

/// Where to find espeak-ng.
#[derive(Debug, Clone, Default)]
pub struct EspeakConfig {
    /// Executable; `None` runs `espeak-ng` from PATH.
    pub bin_path: Option<PathBuf>,
    /// Directory containing `espeak-ng-data`; `None` uses the built-in default.
    pub data_path: Option<PathBuf>,
}

impl EspeakConfig {
    fn command(&self) -> Command {
        let bin = self
            .bin_path
            .as_deref()
            .unwrap_or_else(|| Path::new("espeak-ng"));
        let mut cmd = Command::new(bin);
        if let Some(data) = &self.data_path {
            cmd.env("ESPEAK_DATA_PATH", data);
        }
        cmd
    }
}

impl From<&Configuration> for EspeakConfig {
    fn from(cfg: &Configuration) -> Self {
        Self {
            bin_path: cfg.espeak_path.clone(),
            data_path: cfg.espeak_data_path.clone(),
        }
    }
}

/// Synthesizer backed by the `espeak-ng` command-line program.
///
/// Every call spawns a short-lived process: `--voices` for enumeration and
/// `--stdout` for synthesis, with the text passed on stdin.
///
/// ```rust,no_run
/// use anki_tts::engines::espeak::EspeakSynthesizer;
/// use anki_tts::Synthesizer;
///
/// let mut synth = EspeakSynthesizer::new();
/// synth.select_voice("English_(America)")?;
/// let audio = synth.speak_to_buffer("Hello, world!")?;
/// println!("{} samples at {}Hz", audio.samples.len(), audio.sample_rate);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct EspeakSynthesizer {
    espeak: EspeakConfig,
    voice: Option<VoiceInfo>,
    volume: u8,
    rate: i8,
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EspeakSynthesizer {
    /// Create a synthesizer that uses `espeak-ng` from PATH.
    pub fn new() -> Self {
        Self::with_config(EspeakConfig::default())
    }

    /// Create a synthesizer with explicit espeak-ng binary and data paths.
    ///
    /// Either path can be `None` to fall back to the system default.
    pub fn with_espeak(bin_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Self {
        Self::with_config(EspeakConfig {
            bin_path,
            data_path,
        })
    }

    pub fn with_config(espeak: EspeakConfig) -> Self {
        Self {
            espeak,
            voice: None,
            volume: MAX_VOLUME,
            rate: NEUTRAL_RATE,
        }
    }

    fn speak_args(&self) -> Vec<String> {
        let mut args = vec![
            "-b".to_string(),
            "1".to_string(),
            "--stdin".to_string(),
            "--stdout".to_string(),
            "-a".to_string(),
            amplitude(self.volume).to_string(),
            "-s".to_string(),
            words_per_minute(self.rate).to_string(),
        ];
        // The voice file pins the exact voice; several can share a language.
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.id.clone());
        }
        args
    }

    fn run(&self, args: &[String], stdin_text: Option<&str>) -> Result<Output> {
        let mut child = self
            .espeak
            .command()
            .args(args)
            .stdin(if stdin_text.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    GeneratorError::EngineNotFound
                } else {
                    GeneratorError::Io(e)
                }
            })?;

        if let (Some(text), Some(mut stdin)) = (stdin_text, child.stdin.take()) {
            stdin.write_all(canonicalize_stdin_payload(text).as_bytes())?;
            // Dropping stdin closes the pipe so espeak-ng sees end of input.
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GeneratorError::Synthesis(format!(
                "espeak-ng exited with code {:?}: {stderr}",
                output.status.code()
            )));
        }
        if !output.stderr.is_empty() {
            log::warn!(
                "espeak-ng: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output)
    }
}

impl Synthesizer for EspeakSynthesizer {
    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        let output = self.run(&["--voices".to_string()], None)?;
        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn select_voice(&mut self, name: &str) -> Result<()> {
        let voices = self.voices()?;
        let voice = find_voice(&voices, name)
            .cloned()
            .ok_or_else(|| GeneratorError::VoiceNotFound(name.to_string()))?;
        log::info!("Selected voice {} ({})", voice.name, voice.language);
        self.voice = Some(voice);
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(MAX_VOLUME);
    }

    fn set_rate(&mut self, rate: i8) {
        self.rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    fn speak_to_buffer(&mut self, text: &str) -> Result<AudioBuffer> {
        let output = self.run(&self.speak_args(), Some(text))?;
        AudioBuffer::from_wav_bytes(&output.stdout)
    }
}

/// espeak-ng amplitude (0-200, default 100) for a volume percentage.
fn amplitude(volume: u8) -> u32 {
    u32::from(volume.min(MAX_VOLUME)) * 2
}

/// Speaking speed for a relative rate. Each ten steps triple or third the
/// speed, bounded by what espeak-ng accepts.
fn words_per_minute(rate: i8) -> u32 {
    let steps = f64::from(rate.clamp(MIN_RATE, MAX_RATE)) / 10.0;
    let wpm = (f64::from(DEFAULT_WORDS_PER_MINUTE) * 3f64.powf(steps)).round() as u32;
    wpm.clamp(MIN_WORDS_PER_MINUTE, MAX_WORDS_PER_MINUTE)
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
///  2  en-us           --/M      English_(America)  gmw/en-US           (en 3)
/// ```
fn parse_voice_list(table: &str) -> Vec<VoiceInfo> {
    table
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [_pty, language, _age_gender, name, file, ..] => Some(VoiceInfo {
                    name: (*name).to_string(),
                    language: (*language).to_string(),
                    id: (*file).to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Match by display name first, then language code, then voice file;
/// all comparisons ignore case.
fn find_voice<'a>(voices: &'a [VoiceInfo], name: &str) -> Option<&'a VoiceInfo> {
    voices
        .iter()
        .find(|v| v.name.eq_ignore_ascii_case(name))
        .or_else(|| voices.iter().find(|v| v.language.eq_ignore_ascii_case(name)))
        .or_else(|| voices.iter().find(|v| v.id.eq_ignore_ascii_case(name)))
}

// espeak-ng reads stdin line by line; an unterminated last line can lose its
// final word.
fn canonicalize_stdin_payload(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}
