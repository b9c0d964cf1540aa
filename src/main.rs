use std::process::ExitCode;

use anki_tts::cli::{self, Invocation};
use anki_tts::config::{Configuration, Mode};
use anki_tts::engines::espeak::{EspeakConfig, EspeakSynthesizer};
use anki_tts::engines::lame::LameEncoder;
use anki_tts::pipeline::{self, ConsoleProgress};
use anki_tts::voices;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("anki-tts started...\n");
    let code = match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("run failed: {e:?}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    };
    println!("\nanki-tts finished.");
    code
}

fn run() -> anki_tts::Result<()> {
    let cfg = match cli::parse_args(std::env::args_os())? {
        Invocation::Run(cfg) => cfg,
        Invocation::Help(text) => {
            println!("{text}");
            return Ok(());
        }
    };

    match cfg.mode {
        Mode::ListVoices => list_installed_voices(&cfg),
        Mode::Generate => generate_tts(&cfg),
    }
}

fn list_installed_voices(cfg: &Configuration) -> anki_tts::Result<()> {
    let synth = EspeakSynthesizer::with_config(EspeakConfig::from(cfg));
    let count = voices::list_voices(&synth, &mut std::io::stdout().lock())?;
    log::info!("Listed {count} voices");
    Ok(())
}

fn generate_tts(cfg: &Configuration) -> anki_tts::Result<()> {
    let mut synth = EspeakSynthesizer::with_config(EspeakConfig::from(cfg));
    let mut encoder = LameEncoder::default();
    let mut progress = ConsoleProgress::stdout();
    let report = pipeline::generate(cfg, &mut synth, &mut encoder, &mut progress)?;
    log::info!(
        "Wrote {} files for {} rows",
        report.files.len(),
        report.rows
    );
    Ok(())
}
