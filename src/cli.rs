//! Command-line parsing.
//!
//! Flags override the JSON settings file (`--settings`), which overrides the
//! built-in defaults. Only the parser lives here: whether the selected mode
//! has everything it needs is checked when the mode runs.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};

use crate::config::{Configuration, Mode};
use crate::error::{GeneratorError, Result};

#[derive(Parser, Debug)]
#[command(
    name = "anki-tts",
    about = "Batch-convert flashcard text fields from an XML export into spoken MP3 files",
    disable_help_flag = true
)]
struct Cli {
    /// What to do
    #[arg(short = 'f', long = "function", value_enum, ignore_case = true)]
    function: Option<Mode>,

    /// Voice to speak with (GenerateTTS)
    #[arg(short = 'v', long = "voice")]
    voice: Option<String>,

    /// MP3 bit rate in kbps [default: 64]
    #[arg(short = 'b', long = "bitRate")]
    bit_rate: Option<u32>,

    /// XML file holding the rows (GenerateTTS)
    #[arg(short = 's', long = "sourceXmlFileName")]
    source_xml_file_name: Option<PathBuf>,

    /// Element name of a row [default: AnkiCardRow]
    #[arg(short = 'r', long = "rowElementName")]
    row_element_name: Option<String>,

    /// Element name of a row's id [default: ID]
    #[arg(short = 'i', long = "IDElementName")]
    id_element_name: Option<String>,

    /// Element names of the text fields to speak, comma separated (GenerateTTS)
    #[arg(short = 't', long = "textElementNames", value_delimiter = ',', num_args = 1..)]
    text_element_names: Vec<String>,

    /// Prefix for every MP3 file name
    #[arg(short = 'm', long = "mp3FilePrefix")]
    mp3_file_prefix: Option<String>,

    /// Existing directory to write MP3 files into (GenerateTTS)
    #[arg(short = 'd', long = "destinationDirectory")]
    destination_directory: Option<PathBuf>,

    /// JSON settings file; flags given on the command line take precedence
    #[arg(short = 'c', long = "settings")]
    settings: Option<PathBuf>,

    /// espeak-ng executable [default: espeak-ng on PATH]
    #[arg(long = "espeakPath")]
    espeak_path: Option<PathBuf>,

    /// Directory containing espeak-ng-data
    #[arg(long = "espeakDataPath")]
    espeak_data_path: Option<PathBuf>,

    /// Print help
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    help: Option<bool>,
}

/// What the process should do after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Configuration),
    /// Help was requested; print the text and stop.
    Help(String),
}

/// Parse process arguments (including the program name) into an
/// [`Invocation`].
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            return Ok(Invocation::Help(e.render().to_string()))
        }
        Err(e) => return Err(GeneratorError::CommandLine(e.render().to_string())),
    };
    Ok(Invocation::Run(cli.into_configuration()?))
}

impl Cli {
    fn into_configuration(self) -> Result<Configuration> {
        let base = match &self.settings {
            Some(path) => Configuration::from_json_file(path)?,
            None => Configuration::default(),
        };

        Ok(Configuration {
            mode: self.function.unwrap_or(base.mode),
            voice: self.voice.or(base.voice),
            bit_rate_kbps: self.bit_rate.unwrap_or(base.bit_rate_kbps),
            source_path: self.source_xml_file_name.or(base.source_path),
            row_tag: self.row_element_name.unwrap_or(base.row_tag),
            id_tag: self.id_element_name.unwrap_or(base.id_tag),
            text_tags: if self.text_element_names.is_empty() {
                base.text_tags
            } else {
                self.text_element_names
            },
            file_prefix: self.mp3_file_prefix.unwrap_or(base.file_prefix),
            dest_dir: self.destination_directory.or(base.dest_dir),
            espeak_path: self.espeak_path.or(base.espeak_path),
            espeak_data_path: self.espeak_data_path.or(base.espeak_data_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn run(args: &[&str]) -> Configuration {
        let argv = std::iter::once("anki-tts").chain(args.iter().copied());
        match parse_args(argv).unwrap() {
            Invocation::Run(cfg) => cfg,
            other => panic!("expected a run, got {other:?}"),
        }
    }

    #[test]
    fn no_arguments_lists_voices_with_defaults() {
        let cfg = run(&[]);
        assert_eq!(cfg, Configuration::default());
        assert_eq!(cfg.mode, Mode::ListVoices);
    }

    #[test]
    fn short_flags_fill_every_field() {
        let cfg = run(&[
            "-f", "GenerateTTS", "-v", "German", "-b", "128", "-s", "cards.xml", "-r", "Card",
            "-i", "Key", "-t", "Front,Back", "-m", "card_", "-d", "out",
        ]);
        assert_eq!(cfg.mode, Mode::Generate);
        assert_eq!(cfg.voice.as_deref(), Some("German"));
        assert_eq!(cfg.bit_rate_kbps, 128);
        assert_eq!(cfg.source_path.as_deref(), Some(Path::new("cards.xml")));
        assert_eq!(cfg.row_tag, "Card");
        assert_eq!(cfg.id_tag, "Key");
        assert_eq!(cfg.text_tags, vec!["Front", "Back"]);
        assert_eq!(cfg.file_prefix, "card_");
        assert_eq!(cfg.dest_dir.as_deref(), Some(Path::new("out")));
    }

    #[test]
    fn long_flags_use_original_names() {
        let cfg = run(&[
            "--function",
            "GenerateTTS",
            "--voice",
            "German",
            "--bitRate",
            "96",
            "--sourceXmlFileName",
            "cards.xml",
            "--rowElementName",
            "Card",
            "--IDElementName",
            "Key",
            "--textElementNames",
            "Front",
            "--mp3FilePrefix",
            "de_",
            "--destinationDirectory",
            "out",
        ]);
        assert_eq!(cfg.mode, Mode::Generate);
        assert_eq!(cfg.bit_rate_kbps, 96);
        assert_eq!(cfg.id_tag, "Key");
        assert_eq!(cfg.text_tags, vec!["Front"]);
        assert_eq!(cfg.file_prefix, "de_");
    }

    #[test]
    fn function_is_case_insensitive() {
        assert_eq!(run(&["-f", "generatetts"]).mode, Mode::Generate);
        assert_eq!(run(&["-f", "listinstalledvoices"]).mode, Mode::ListVoices);
    }

    #[test]
    fn text_tags_accept_spaces_and_commas() {
        let cfg = run(&["-t", "Front", "Back,Extra"]);
        assert_eq!(cfg.text_tags, vec!["Front", "Back", "Extra"]);
    }

    #[test]
    fn help_returns_usage_without_running() {
        for flag in ["-?", "--help"] {
            match parse_args(["anki-tts", flag]).unwrap() {
                Invocation::Help(text) => assert!(text.contains("--textElementNames"), "{text}"),
                other => panic!("expected help, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_function_is_a_command_line_error() {
        let err = parse_args(["anki-tts", "-f", "Dance"]).unwrap_err();
        assert!(matches!(err, GeneratorError::CommandLine(_)));
    }

    #[test]
    fn non_numeric_bit_rate_is_a_command_line_error() {
        let err = parse_args(["anki-tts", "-b", "fast"]).unwrap_err();
        assert!(matches!(err, GeneratorError::CommandLine(_)));
    }

    #[test]
    fn unknown_flag_is_a_command_line_error() {
        let err = parse_args(["anki-tts", "--colour"]).unwrap_err();
        assert!(matches!(err, GeneratorError::CommandLine(_)));
    }

    #[test]
    fn flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        std::fs::write(
            &settings,
            r#"{ "mode": "GenerateTTS", "voice": "German", "bitRateKbps": 128, "filePrefix": "de_" }"#,
        )
        .unwrap();

        let cfg = run(&["-c", settings.to_str().unwrap(), "-v", "French"]);
        assert_eq!(cfg.mode, Mode::Generate);
        assert_eq!(cfg.voice.as_deref(), Some("French"));
        assert_eq!(cfg.bit_rate_kbps, 128);
        assert_eq!(cfg.file_prefix, "de_");
    }

    #[test]
    fn missing_settings_file_fails_parsing() {
        let err = parse_args(["anki-tts", "-c", "/nonexistent/settings.json"]).unwrap_err();
        assert!(matches!(err, GeneratorError::Settings { .. }));
    }
}
