//! Speech synthesis and MP3 encoding back-ends.
//!
//! # Available Engines
//!
//! - `espeak` - [`espeak::EspeakSynthesizer`], drives the `espeak-ng` program
//!   (always built; espeak-ng must be installed at run time)
//! - `lame` - [`lame::LameEncoder`], MP3 via libmp3lame (cargo feature `lame`,
//!   on by default)

pub mod espeak;
#[cfg(feature = "lame")]
pub mod lame;
