//! Core data structures for parsed KANJIDIC entries and caller options.
//!
//! This module defines:
//! - The semantic keys used in every entry
//! - The [`Kanji`] entry itself
//! - The reading mode threaded through line classification
//! - Load and format options

use encoding_rs::Encoding;
use indexmap::IndexMap;

use super::value::{Fields, Value};

/// Semantic keys that do not come from a letter code.
pub mod keys {
    pub const CHARACTER: &str = "character";
    pub const JIS_CODE: &str = "jis_code";
    pub const DICTIONARIES: &str = "dictionaries";
    pub const READING: &str = "reading";
    pub const NAME_READING: &str = "name_reading";
    pub const RADICAL_NAME: &str = "radical_name";
    pub const MEANINGS: &str = "meanings";
    pub const KOKUJI: &str = "kokuji";
    pub const NUMBER: &str = "number";
    pub const PAGE: &str = "page";
    pub const STROKES: &str = "strokes";
    pub const POSITION: &str = "position";
    pub const BOTH: &str = "both";
    pub const DISAGREEMENT: &str = "disagreement";
    pub const CROSSREFERENCE: &str = "crossreference";
    pub const MISCLASSIFICATION: &str = "misclassification";
    pub const UNDEFINED: &str = "undefined";
}

/// One parsed dictionary line.
///
/// Always holds the character, its source-encoding identifier and a
/// (possibly empty) map of dictionary references. Everything else depends on
/// what the line contained.
#[derive(Debug, Clone, PartialEq)]
pub struct Kanji {
    fields: Fields,
}

impl Kanji {
    pub(crate) fn new(character: &str, jis_code: String) -> Self {
        let mut fields = Fields::new();
        fields.insert(keys::CHARACTER.to_string(), Value::from(character));
        fields.insert(keys::JIS_CODE.to_string(), Value::Text(jis_code));
        fields.insert(keys::DICTIONARIES.to_string(), Value::Map(Fields::new()));
        Self { fields }
    }

    /// The character glyph this entry describes.
    pub fn character(&self) -> &str {
        self.text(keys::CHARACTER)
    }

    /// The source-encoding identifier, prefixed with the load scheme tag.
    pub fn jis_code(&self) -> &str {
        self.text(keys::JIS_CODE)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The dictionary references of this entry, keyed by source identifier.
    pub fn dictionaries(&self) -> Option<&Fields> {
        self.get(keys::DICTIONARIES).and_then(Value::as_map)
    }

    /// The reference of this entry in one external source.
    pub fn dictionary(&self, source_id: &str) -> Option<&Value> {
        self.dictionaries().and_then(|d| d.get(source_id))
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    fn text(&self, key: &str) -> &str {
        match self.fields.get(key) {
            Some(Value::Text(s)) => s,
            Some(Value::List(items)) => items.first().and_then(Value::as_text).unwrap_or(""),
            _ => "",
        }
    }
}

/// The bucket un-coded tokens currently fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingMode {
    #[default]
    Reading,
    NameReading,
    RadicalName,
}

impl ReadingMode {
    pub fn key(&self) -> &'static str {
        match self {
            ReadingMode::Reading => keys::READING,
            ReadingMode::NameReading => keys::NAME_READING,
            ReadingMode::RadicalName => keys::RADICAL_NAME,
        }
    }
}

/// Options controlling how a dictionary file is loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Tag prefixed onto every source-encoding identifier.
    pub scheme: String,
    /// Text encoding of the file. KANJIDIC is distributed as EUC-JP.
    pub encoding: &'static Encoding,
}

impl LoadOptions {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..Self::default()
        }
    }

    /// Sets the encoding from a label such as `"utf-8"` or `"euc-jp"`.
    pub fn with_encoding_label(mut self, label: &str) -> Self {
        self.encoding = crate::kanjidic::utils::parse_encoding(label);
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            scheme: String::new(),
            encoding: encoding_rs::EUC_JP,
        }
    }
}

/// Whether, and where, a key is rendered by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Render in this position; lower ranks render first.
    Rank(u32),
    /// Never render.
    Hidden,
}

/// Per-key visibility for the formatter.
///
/// Keys without an entry render after every ranked key, in the entry's own
/// order. `character` is ranked 0 unless set explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatOptions {
    visibility: IndexMap<String, Visibility>,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The short view: character, readings and meanings first, no dictionaries.
    pub fn summary() -> Self {
        Self::new()
            .rank(keys::CHARACTER, 0)
            .rank(keys::READING, 1)
            .rank(keys::NAME_READING, 2)
            .rank(keys::RADICAL_NAME, 3)
            .rank(keys::MEANINGS, 4)
            .hide(keys::DICTIONARIES)
    }

    pub fn rank(mut self, key: impl Into<String>, rank: u32) -> Self {
        self.visibility.insert(key.into(), Visibility::Rank(rank));
        self
    }

    pub fn hide(mut self, key: impl Into<String>) -> Self {
        self.visibility.insert(key.into(), Visibility::Hidden);
        self
    }

    pub fn get(&self, key: &str) -> Option<Visibility> {
        self.visibility.get(key).copied()
    }

    /// Every configured key with its visibility, `character` included.
    pub(crate) fn resolved(&self) -> IndexMap<String, Visibility> {
        let mut all = IndexMap::with_capacity(self.visibility.len() + 1);
        all.insert(keys::CHARACTER.to_string(), Visibility::Rank(0));
        for (key, visibility) in &self.visibility {
            all.insert(key.clone(), *visibility);
        }
        all
    }
}
