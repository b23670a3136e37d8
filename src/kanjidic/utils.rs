//! Text decoding utilities

use encoding_rs::Encoding;
use log::{debug, warn};
use std::fs;
use std::path::Path;

use super::types::error::{KanjidicError, Result};

/// Resolves an encoding label such as `"euc-jp"`, `"shift_jis"` or `"utf-8"`.
///
/// Unknown labels fall back to UTF-8.
pub fn parse_encoding(label: &str) -> &'static Encoding {
    Encoding::for_label(label.trim().as_bytes()).unwrap_or_else(|| {
        warn!("Unknown encoding label '{}', falling back to UTF-8", label);
        encoding_rs::UTF_8
    })
}

/// Reads a whole file and decodes it strictly.
///
/// A byte order mark, if present, overrides `encoding`.
pub fn read_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = fs::read(path)?;
    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(KanjidicError::Decoding {
            path: path.to_path_buf(),
            encoding: used.name(),
        });
    }
    debug!("Decoded {} bytes from {} as {}", bytes.len(), path.display(), used.name());
    Ok(text.into_owned())
}
