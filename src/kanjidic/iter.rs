//! Sequential parsing of dictionary text.
//!
//! [`Entries`] walks the lines of a decoded file lazily, skipping comment
//! lines and yielding one [`Kanji`] per data line, in file order.
//!
//! # Example
//! ```no_run
//! # use kanjidic_reader::{CodeRegistry, Entries};
//! let text = std::fs::read_to_string("kanjidic.utf8").unwrap();
//! let registry = CodeRegistry::standard();
//! for kanji in Entries::new(&registry, &text, "") {
//!     println!("{}", kanji.unwrap().character());
//! }
//! ```

use std::str::Lines;

use super::codes::CodeRegistry;
use super::format::line;
use super::types::error::Result;
use super::types::models::Kanji;

/// Iterator over the entries of a dictionary text.
pub struct Entries<'a> {
    registry: &'a CodeRegistry,
    lines: Lines<'a>,
    scheme: &'a str,
    skipped: usize,
}

impl<'a> Entries<'a> {
    pub fn new(registry: &'a CodeRegistry, text: &'a str, scheme: &'a str) -> Self {
        Self {
            registry,
            lines: text.lines(),
            scheme,
            skipped: 0,
        }
    }

    /// Number of comment or header lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<Kanji>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.lines.next()?;
            match line::parse_line(self.registry, raw, self.scheme) {
                Ok(Some(kanji)) => return Some(Ok(kanji)),
                Ok(None) => self.skipped += 1,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
