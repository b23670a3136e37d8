//! # kanjidic-reader
//!
//! A reader for KANJIDIC-style kanji dictionary files.
//!
//! Each data line describes one character: its glyph, its JIS code, then a
//! sequence of bracketed meanings, letter-coded attributes and bare readings.
//! Every line is parsed into a [`Kanji`] entry; a [`Kanjidic`] keeps the
//! entries of one or more files in memory and renders them as indented text,
//! resolving cross-references against the loaded entries.
pub mod kanjidic;

// Re-export the main types for convenience
pub use kanjidic::{
    format::line::parse_line,
    format::merge::merge,
    keys,
    CodeRegistry,
    Entries,
    Fields,
    FormatOptions,
    Kanji,
    Kanjidic,
    KanjidicError,
    LoadOptions,
    ReadingMode,
    Renderer,
    Result,
    Value,
    Visibility,
};
