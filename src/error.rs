use std::path::PathBuf;

use crate::naming::MAX_TEXT_FIELDS;

/// Every way a run can fail. None of these are retried; the driver prints
/// the message and stops.
#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    #[error("{0}")]
    CommandLine(String),
    #[error("Couldn't read the settings file '{path}': {reason}")]
    Settings { path: PathBuf, reason: String },
    #[error("Couldn't load the XML file '{path}': {source}")]
    DocumentLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Can't find '{tag}' nodes in the loaded XML file '{path}'.")]
    NoRowsFound { tag: String, path: PathBuf },
    #[error("Can't find '{tag}' node in the loaded XML file '{path}'.")]
    MissingField { tag: String, path: PathBuf },
    #[error("Voice '{0}' is not installed. Run with `-f ListInstalledVoices` to see available voices.")]
    VoiceNotFound(String),
    #[error(
        "{0} text elements configured, but output files are suffixed A-Z so at most {max} are supported",
        max = MAX_TEXT_FIELDS
    )]
    TooManyTextFields(usize),
    #[error("Unsupported MP3 bit rate {0} kbps")]
    UnsupportedBitRate(u32),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EngineNotFound,
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("MP3 encoding failed: {0}")]
    Encoding(String),
    #[error("Couldn't write '{path}': {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
