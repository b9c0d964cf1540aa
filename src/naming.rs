//! Output file naming.
//!
//! Each text field of a row gets one file, `<prefix><id><letter>.mp3`, where
//! the letter is `A` for the first configured text field, `B` for the second
//! and so on. Only single letters are used, so a configuration may name at
//! most [`MAX_TEXT_FIELDS`] text fields; anything past `Z` is rejected
//! up front rather than producing punctuation-suffixed files.

use std::path::{Path, PathBuf};

use crate::error::{GeneratorError, Result};

/// Number of letters available for field suffixes (`A`..=`Z`).
pub const MAX_TEXT_FIELDS: usize = 26;

/// Suffix letter for the text field at `index` (zero-based).
pub fn field_suffix(index: usize) -> Option<char> {
    if index < MAX_TEXT_FIELDS {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

/// `<prefix><id><suffix>.mp3`
pub fn file_name(prefix: &str, id: &str, index: usize) -> Result<String> {
    let suffix = field_suffix(index).ok_or(GeneratorError::TooManyTextFields(index + 1))?;
    Ok(format!("{prefix}{id}{suffix}.mp3"))
}

/// Full path of the file for one (row, text field) pair.
pub fn output_path(dest_dir: &Path, prefix: &str, id: &str, index: usize) -> Result<PathBuf> {
    Ok(dest_dir.join(file_name(prefix, id, index)?))
}

/// Fails with [`GeneratorError::TooManyTextFields`] when `count` fields
/// cannot all be given a distinct letter.
pub fn check_field_count(count: usize) -> Result<()> {
    if count > MAX_TEXT_FIELDS {
        return Err(GeneratorError::TooManyTextFields(count));
    }
    Ok(())
}
