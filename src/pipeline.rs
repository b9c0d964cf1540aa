//! The row-by-row text-to-MP3 run.
//!
//! Every failure aborts the run. Files written before the failure stay on
//! disk; they are not a checkpoint and a re-run overwrites them.

use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};

use crate::config::Configuration;
use crate::document::Document;
use crate::error::{GeneratorError, Result};
use crate::naming;
use crate::{Encoder, Synthesizer, MAX_VOLUME, NEUTRAL_RATE};

/// Receives operator-facing progress: one call per row, one per file.
///
/// An error from the sink aborts the run like any other failure.
pub trait Progress {
    fn row_started(&mut self, id: &str) -> Result<()>;
    fn file_written(&mut self, path: &Path) -> Result<()>;
}

/// Prints the row id, then `<path> ok.` for each file, one line each.
#[derive(Debug)]
pub struct ConsoleProgress<W = Stdout> {
    out: W,
}

impl ConsoleProgress {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn row_started(&mut self, id: &str) -> Result<()> {
        writeln!(self.out, "{id}")?;
        Ok(())
    }

    fn file_written(&mut self, path: &Path) -> Result<()> {
        writeln!(self.out, "{} ok.", path.display())?;
        Ok(())
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub rows: usize,
    /// Written files, in write order.
    pub files: Vec<PathBuf>,
}

/// Synthesize every configured text field of every row to an MP3 file.
///
/// Checks run before any file is touched, in this order: required settings
/// and text-field count, encoder bit rate, voice selection, document load,
/// row lookup (zero rows is an error).
pub fn generate<S, E, P>(
    cfg: &Configuration,
    synth: &mut S,
    encoder: &mut E,
    progress: &mut P,
) -> Result<GenerationReport>
where
    S: Synthesizer + ?Sized,
    E: Encoder + ?Sized,
    P: Progress + ?Sized,
{
    let targets = cfg.validate_for_generation()?;
    encoder.check_bit_rate(cfg.bit_rate_kbps)?;

    synth.select_voice(targets.voice)?;
    synth.set_volume(MAX_VOLUME);
    synth.set_rate(NEUTRAL_RATE);

    let doc = Document::load(targets.source_path)?;
    let rows = doc.rows(&cfg.row_tag);
    if rows.is_empty() {
        return Err(GeneratorError::NoRowsFound {
            tag: cfg.row_tag.clone(),
            path: doc.path().to_path_buf(),
        });
    }
    log::info!("Found {} '{}' rows", rows.len(), cfg.row_tag);

    let mut report = GenerationReport::default();
    for row in rows {
        let id = doc.value(row, &cfg.id_tag)?;
        progress.row_started(id)?;

        for (index, tag) in targets.text_tags.iter().enumerate() {
            let text = doc.value(row, tag)?;
            let path = naming::output_path(targets.dest_dir, &cfg.file_prefix, id, index)?;

            let audio = synth.speak_to_buffer(text)?;
            log::debug!(
                "Synthesized {tag} of row {id}: {} samples, {:.2}s",
                audio.samples.len(),
                audio.duration_secs()
            );
            let mp3 = encoder.encode(&audio, cfg.bit_rate_kbps)?;
            std::fs::write(&path, mp3).map_err(|source| GeneratorError::IoWrite {
                path: path.clone(),
                source,
            })?;

            progress.file_written(&path)?;
            report.files.push(path);
        }
        report.rows += 1;
    }

    Ok(report)
}
