use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};
use crate::naming;

pub const DEFAULT_BIT_RATE_KBPS: u32 = 64;
pub const DEFAULT_ROW_TAG: &str = "AnkiCardRow";
pub const DEFAULT_ID_TAG: &str = "ID";

/// What a run does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Mode {
    /// Print the names of the installed synthesis voices.
    #[default]
    #[serde(rename = "ListInstalledVoices")]
    #[value(name = "ListInstalledVoices")]
    ListVoices,
    /// Synthesize every configured text field of every row to MP3.
    #[serde(rename = "GenerateTTS")]
    #[value(name = "GenerateTTS")]
    Generate,
}

/// Settings for one run.
///
/// Built once, from defaults, an optional JSON settings file and the command
/// line (in increasing precedence), and never modified afterwards.
///
/// ```
/// use anki_tts::config::{ConfigurationBuilder, Mode};
///
/// let cfg = ConfigurationBuilder::default()
///     .mode(Mode::Generate)
///     .voice("English_(America)")
///     .source_path("cards.xml")
///     .text_tags(vec!["Front".to_string(), "Back".to_string()])
///     .dest_dir("out")
///     .build()?;
/// assert_eq!(cfg.row_tag, "AnkiCardRow");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default, rename_all = "camelCase")]
#[builder(default, setter(into))]
pub struct Configuration {
    pub mode: Mode,
    #[builder(setter(into, strip_option))]
    pub voice: Option<String>,
    pub bit_rate_kbps: u32,
    #[builder(setter(into, strip_option))]
    pub source_path: Option<PathBuf>,
    pub row_tag: String,
    pub id_tag: String,
    pub text_tags: Vec<String>,
    pub file_prefix: String,
    #[builder(setter(into, strip_option))]
    pub dest_dir: Option<PathBuf>,
    /// espeak-ng executable; `None` looks it up on PATH.
    #[builder(setter(into, strip_option))]
    pub espeak_path: Option<PathBuf>,
    /// espeak-ng data directory; `None` uses the executable's built-in default.
    #[builder(setter(into, strip_option))]
    pub espeak_data_path: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            voice: None,
            bit_rate_kbps: DEFAULT_BIT_RATE_KBPS,
            source_path: None,
            row_tag: DEFAULT_ROW_TAG.to_string(),
            id_tag: DEFAULT_ID_TAG.to_string(),
            text_tags: Vec::new(),
            file_prefix: String::new(),
            dest_dir: None,
            espeak_path: None,
            espeak_data_path: None,
        }
    }
}

/// The settings `Generate` cannot run without, borrowed from a validated
/// [`Configuration`].
#[derive(Debug, Clone, Copy)]
pub struct GenerationTargets<'a> {
    pub voice: &'a str,
    pub source_path: &'a Path,
    pub text_tags: &'a [String],
    pub dest_dir: &'a Path,
}

impl Configuration {
    /// Load settings from a JSON file. Keys are the camelCase field names;
    /// missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| GeneratorError::Settings {
            path: path.to_path_buf(),
            reason: format!("Failed to parse JSON: {e}"),
        })
    }

    /// Check that everything `Generate` needs is present.
    pub fn validate_for_generation(&self) -> Result<GenerationTargets<'_>> {
        let voice = required(self.voice.as_deref(), "voice")?;
        let source_path = required(self.source_path.as_deref(), "sourceXmlFileName")?;
        let dest_dir = required(self.dest_dir.as_deref(), "destinationDirectory")?;
        if self.text_tags.is_empty() {
            return Err(missing("textElementNames"));
        }
        naming::check_field_count(self.text_tags.len())?;

        Ok(GenerationTargets {
            voice,
            source_path,
            text_tags: &self.text_tags,
            dest_dir,
        })
    }
}

fn required<'a, T: ?Sized>(value: Option<&'a T>, flag: &str) -> Result<&'a T> {
    value.ok_or_else(|| missing(flag))
}

fn missing(flag: &str) -> GeneratorError {
    GeneratorError::CommandLine(format!("GenerateTTS requires --{flag}"))
}
