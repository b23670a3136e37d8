//! Line format parsing layer for KANJIDIC files.
//!
//! # Module Organization
//!
//! - [`pattern`]: The composite regex classifying line elements
//! - [`line`]: Tokenizes a line and classifies each element
//! - [`merge`]: Deep-merges classified elements into the entry
//!
//! # Data Flow
//!
//! ```text
//! raw line ──► line::tokenize ──► pattern::classify ──► CodeTable::dispatch
//!                                                             │
//!                               Kanji ◄── merge::merge ◄──────┘
//! ```

pub mod line;
pub mod merge;
pub mod pattern;
