use std::io::Write;

use crate::error::Result;
use crate::Synthesizer;

pub const BANNER: &str = "The installed TTS voices:";

/// Print [`BANNER`] and then every installed voice name, one per line.
/// Returns how many voices were listed.
pub fn list_voices<S, W>(synth: &S, out: &mut W) -> Result<usize>
where
    S: Synthesizer + ?Sized,
    W: Write + ?Sized,
{
    let voices = synth.voices()?;

    writeln!(out, "{BANNER}")?;
    for voice in &voices {
        writeln!(out, "{}", voice.name)?;
    }
    Ok(voices.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use crate::{AudioBuffer, VoiceInfo};

    struct Installed(Vec<&'static str>);

    impl Synthesizer for Installed {
        fn voices(&self) -> Result<Vec<VoiceInfo>> {
            Ok(self
                .0
                .iter()
                .map(|name| VoiceInfo {
                    name: name.to_string(),
                    language: "en".to_string(),
                    id: name.to_lowercase(),
                })
                .collect())
        }

        fn select_voice(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }

        fn set_volume(&mut self, _volume: u8) {}

        fn set_rate(&mut self, _rate: i8) {}

        fn speak_to_buffer(&mut self, _text: &str) -> Result<AudioBuffer> {
            unreachable!("listing never synthesizes")
        }
    }

    struct Broken;

    impl Synthesizer for Broken {
        fn voices(&self) -> Result<Vec<VoiceInfo>> {
            Err(GeneratorError::EngineNotFound)
        }

        fn select_voice(&mut self, _name: &str) -> Result<()> {
            Err(GeneratorError::EngineNotFound)
        }

        fn set_volume(&mut self, _volume: u8) {}

        fn set_rate(&mut self, _rate: i8) {}

        fn speak_to_buffer(&mut self, _text: &str) -> Result<AudioBuffer> {
            Err(GeneratorError::EngineNotFound)
        }
    }

    #[test]
    fn prints_banner_then_one_name_per_line() {
        let mut out = Vec::new();
        let count = list_voices(&Installed(vec!["Zira", "David"]), &mut out).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "The installed TTS voices:\nZira\nDavid\n"
        );
    }

    #[test]
    fn no_voices_prints_only_the_banner() {
        let mut out = Vec::new();
        assert_eq!(list_voices(&Installed(vec![]), &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{BANNER}\n"));
    }

    #[test]
    fn engine_failure_aborts_before_printing() {
        let mut out = Vec::new();
        assert!(matches!(
            list_voices(&Broken, &mut out),
            Err(GeneratorError::EngineNotFound)
        ));
        assert!(out.is_empty());
    }
}
