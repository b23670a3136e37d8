//! Core KANJIDIC reader module

pub mod codes;
pub mod format;
pub mod iter;
pub mod reader;
pub mod render;
pub mod types;
pub mod utils;

pub use codes::{CodeRegistry, CodeTable, Handler, SimpleCode, Source, SpecialCode, SpecialHandler};
pub use iter::Entries;
pub use reader::Kanjidic;
pub use render::Renderer;
pub use types::error::{KanjidicError, Result};
pub use types::models::{keys, FormatOptions, Kanji, LoadOptions, ReadingMode, Visibility};
pub use types::value::{Fields, Value};
