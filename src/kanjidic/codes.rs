//! The code registry: which letter codes exist and what they mean.
//!
//! Three catalogs describe the codes found in a KANJIDIC line:
//!
//! - **sources**: references into named external dictionaries (`H`, `N`, `DR`, ...).
//!   Their values land under `dictionaries.<source id>`.
//! - **simple codes**: single-valued attributes (`S` strokes, `F` frequency, ...).
//!   Their values land under a top-level key.
//! - **special codes**: codes needing their own logic (`T`, `M`, `X`, `Z`, `IN`).
//!
//! The catalogs are folded into one [`CodeTable`] keyed by code, special codes
//! winning over the other two. The table and the element pattern compiled from
//! it are built on first use and cached until a catalog changes or
//! [`CodeRegistry::reload`] is called.

use indexmap::IndexMap;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use super::format::pattern::ElementPattern;
use super::types::error::Result;
use super::types::models::{keys, ReadingMode};
use super::types::value::{entry, Fields};

/// Logic for a special code: `(table, subcode, value, reading mode) -> partial entry`.
///
/// The handler may redirect the reading mode through the `&mut ReadingMode`.
pub type SpecialHandler = fn(&CodeTable, &str, &str, &mut ReadingMode) -> Fields;

/// A named external dictionary referenced by a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub code: String,
    pub id: String,
    pub name: String,
    pub citation: Option<String>,
}

/// A code holding a single value under a top-level key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCode {
    pub code: String,
    pub key: String,
    pub label: String,
}

/// A code dispatched to custom logic.
#[derive(Clone)]
pub struct SpecialCode {
    pub code: String,
    pub handler: SpecialHandler,
}

impl fmt::Debug for SpecialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialCode").field("code", &self.code).finish_non_exhaustive()
    }
}

/// How a matched code turns into a partial entry.
#[derive(Clone)]
pub enum Handler {
    /// `{ key: subcode + value }`
    DirectKey(String),
    /// `{ dictionaries: { source: subcode + value } }`
    SourceKey(String),
    Custom(SpecialHandler),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::DirectKey(key) => f.debug_tuple("DirectKey").field(key).finish(),
            Handler::SourceKey(id) => f.debug_tuple("SourceKey").field(id).finish(),
            Handler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Handler {
    pub fn apply(
        &self,
        table: &CodeTable,
        subcode: &str,
        value: &str,
        mode: &mut ReadingMode,
    ) -> Fields {
        match self {
            Handler::DirectKey(key) => entry(key.as_str(), format!("{}{}", subcode, value)),
            Handler::SourceKey(id) => entry(
                keys::DICTIONARIES,
                entry(id.as_str(), format!("{}{}", subcode, value)),
            ),
            Handler::Custom(handler) => handler(table, subcode, value, mode),
        }
    }
}

/// The unified lookup from code to handler.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    handlers: IndexMap<String, Handler>,
}

impl CodeTable {
    pub fn get(&self, code: &str) -> Option<&Handler> {
        self.handlers.get(code)
    }

    /// Every code in the table, in catalog order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the handler registered for `code`, or returns `None` if there is none.
    pub fn dispatch(
        &self,
        code: &str,
        subcode: &str,
        value: &str,
        mode: &mut ReadingMode,
    ) -> Option<Fields> {
        self.get(code)
            .map(|handler| handler.apply(self, subcode, value, mode))
    }
}

/// The catalogs plus the caches derived from them.
#[derive(Debug)]
pub struct CodeRegistry {
    sources: Vec<Source>,
    simple: Vec<SimpleCode>,
    special: Vec<SpecialCode>,
    uncoded: Vec<(String, String)>,

    table: OnceLock<CodeTable>,
    pattern: OnceLock<ElementPattern>,
    labels: OnceLock<HashMap<String, String>>,
}

static SHARED: OnceLock<CodeRegistry> = OnceLock::new();

impl CodeRegistry {
    /// The registry for standard KANJIDIC files.
    pub fn standard() -> Self {
        Self::from_catalogs(
            standard_sources(),
            standard_simple_codes(),
            standard_special_codes(),
            standard_uncoded(),
        )
    }

    /// A process-wide standard registry, for callers that never mutate it.
    pub fn shared() -> &'static CodeRegistry {
        SHARED.get_or_init(CodeRegistry::standard)
    }

    pub fn from_catalogs(
        sources: Vec<Source>,
        simple: Vec<SimpleCode>,
        special: Vec<SpecialCode>,
        uncoded: Vec<(String, String)>,
    ) -> Self {
        Self {
            sources,
            simple,
            special,
            uncoded,
            table: OnceLock::new(),
            pattern: OnceLock::new(),
            labels: OnceLock::new(),
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn simple_codes(&self) -> &[SimpleCode] {
        &self.simple
    }

    pub fn special_codes(&self) -> &[SpecialCode] {
        &self.special
    }

    pub fn uncoded(&self) -> &[(String, String)] {
        &self.uncoded
    }

    /// Mutable access to the source catalog. Cached data is dropped.
    pub fn sources_mut(&mut self) -> &mut Vec<Source> {
        self.invalidate();
        &mut self.sources
    }

    /// Mutable access to the simple-code catalog. Cached data is dropped.
    pub fn simple_codes_mut(&mut self) -> &mut Vec<SimpleCode> {
        self.invalidate();
        &mut self.simple
    }

    /// Mutable access to the special-code catalog. Cached data is dropped.
    pub fn special_codes_mut(&mut self) -> &mut Vec<SpecialCode> {
        self.invalidate();
        &mut self.special
    }

    /// Mutable access to the labels of uncoded keys. Cached labels are dropped.
    pub fn uncoded_mut(&mut self) -> &mut Vec<(String, String)> {
        self.labels.take();
        &mut self.uncoded
    }

    /// Rebuilds the code table, the element pattern and the label catalog.
    pub fn reload(&mut self) -> Result<()> {
        self.invalidate();
        self.pattern()?;
        self.labels();
        Ok(())
    }

    /// The unified code table.
    pub fn codes(&self) -> &CodeTable {
        self.table.get_or_init(|| self.build_table())
    }

    /// The element pattern compiled from [`codes`](Self::codes).
    pub fn pattern(&self) -> Result<&ElementPattern> {
        if let Some(pattern) = self.pattern.get() {
            return Ok(pattern);
        }
        let built = ElementPattern::build(self.codes().codes())?;
        Ok(self.pattern.get_or_init(|| built))
    }

    /// The display label of a semantic key, if the catalogs know it.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels().get(key).map(String::as_str)
    }

    /// Looks up a source by its identifier.
    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    fn labels(&self) -> &HashMap<String, String> {
        self.labels.get_or_init(|| {
            let mut labels = HashMap::new();
            for source in &self.sources {
                labels.insert(source.id.clone(), source.name.clone());
            }
            for code in &self.simple {
                labels.insert(code.key.clone(), code.label.clone());
            }
            for (key, label) in &self.uncoded {
                labels.insert(key.clone(), label.clone());
            }
            labels
        })
    }

    fn build_table(&self) -> CodeTable {
        let mut handlers = IndexMap::new();
        for source in &self.sources {
            handlers.insert(source.code.clone(), Handler::SourceKey(source.id.clone()));
        }
        for code in &self.simple {
            handlers.insert(code.code.clone(), Handler::DirectKey(code.key.clone()));
        }
        for code in &self.special {
            handlers.insert(code.code.clone(), Handler::Custom(code.handler));
        }
        debug!("Built code table with {} codes", handlers.len());
        CodeTable { handlers }
    }

    fn invalidate(&mut self) {
        self.table.take();
        self.pattern.take();
        self.labels.take();
    }
}

impl Default for CodeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Clone for CodeRegistry {
    fn clone(&self) -> Self {
        Self::from_catalogs(
            self.sources.clone(),
            self.simple.clone(),
            self.special.clone(),
            self.uncoded.clone(),
        )
    }
}

// ---------------------------------------------------------------------------
// Special code handlers
// ---------------------------------------------------------------------------

/// `T1` switches un-coded tokens to name readings, `T2` to radical names.
///
/// Only the leading digits of the value count, so `T1x` is `T1`.
fn reading_mode(_: &CodeTable, _subcode: &str, value: &str, mode: &mut ReadingMode) -> Fields {
    match leading_number(value) {
        Some(1) => *mode = ReadingMode::NameReading,
        Some(2) => *mode = ReadingMode::RadicalName,
        _ => {}
    }
    Fields::new()
}

/// The number spelled by the leading ASCII digits of `value`, if any.
fn leading_number(value: &str) -> Option<u64> {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    match value[..end].trim_start_matches('0') {
        "" if end > 0 => Some(0),
        digits => digits.parse().ok(),
    }
}

/// Morohashi index: `MN` is the entry number, `MP` volume.page.
fn morohashi(_: &CodeTable, subcode: &str, value: &str, _: &mut ReadingMode) -> Fields {
    let key = match subcode {
        "N" => keys::NUMBER,
        "P" => keys::PAGE,
        _ => keys::UNDEFINED,
    };
    entry(keys::DICTIONARIES, entry(MOROHASHI, entry(key, value)))
}

/// Cross-reference. The subcode names the code the value belongs to; `J`
/// is a JIS code.
fn crossreference(table: &CodeTable, subcode: &str, value: &str, _: &mut ReadingMode) -> Fields {
    let target = if subcode == "J" {
        entry(keys::JIS_CODE, value)
    } else if let Some(handler) = table.get(subcode) {
        // The referenced code cannot switch this line's reading mode.
        let mut scratch = ReadingMode::default();
        handler.apply(table, "", value, &mut scratch)
    } else {
        entry(keys::UNDEFINED, value)
    };
    entry(keys::CROSSREFERENCE, target)
}

/// SKIP mis-classification, qualified by the first subcode letter.
fn misclassification(_: &CodeTable, subcode: &str, value: &str, _: &mut ReadingMode) -> Fields {
    let key = match subcode.chars().next() {
        Some('S') => keys::STROKES,
        Some('P') => keys::POSITION,
        Some('B') => keys::BOTH,
        Some('R') => keys::DISAGREEMENT,
        _ => keys::UNDEFINED,
    };
    entry(keys::MISCLASSIFICATION, entry(key, value))
}

/// Spahn & Hadamitzky "Kanji & Kana" index. The value is kept without subcode.
fn kanji_and_kana(_: &CodeTable, _subcode: &str, value: &str, _: &mut ReadingMode) -> Fields {
    entry(keys::DICTIONARIES, entry(KANJI_AND_KANA, value))
}

const MOROHASHI: &str = "moro";
const KANJI_AND_KANA: &str = "sh_kk";

// ---------------------------------------------------------------------------
// Standard catalogs
// ---------------------------------------------------------------------------

fn standard_sources() -> Vec<Source> {
    const SOURCES: &[(&str, &str, &str, Option<&str>)] = &[
        (
            "H",
            "halpern_njecd",
            "New Japanese-English Character Dictionary",
            Some("(1990), edited by Jack Halpern"),
        ),
        (
            "N",
            "nelson_c",
            "Modern Reader's Japanese-English Character Dictionary",
            Some("edited by Andrew Nelson"),
        ),
        (
            "V",
            "nelson_n",
            "The New Nelson Japanese-English Character Dictionary",
            Some("edited by John Haig"),
        ),
        ("DA", "sh_kk2", "Kanji & Kana", Some("(2011), by Spahn & Hadamitzky")),
        ("I", "sh_desc", "The Kanji Dictionary", Some("(1996), by Spahn & Hadamitzky")),
        ("IN", KANJI_AND_KANA, "Kanji & Kana", Some("(1st edition), by Spahn & Hadamitzky")),
        (
            "DB",
            "busy_people",
            "Japanese For Busy People",
            Some("vols I-III, published by the AJLT"),
        ),
        ("DC", "crowley", "The Kanji Way to Japanese Language Power", Some("by Dale Crowley")),
        (
            "DF",
            "jf_cards",
            "Japanese Kanji Flashcards",
            Some("by Max Hodges and Tomoko Okazaki (White Rabbit Press)"),
        ),
        ("DG", "kodansha_compact", "Kodansha Compact Kanji Guide", None),
        (
            "DH",
            "henshall3",
            "A Guide To Reading and Writing Japanese",
            Some("3rd edition, edited by Ken Henshall et al"),
        ),
        ("DJ", "kanji_in_context", "Kanji in Context", Some("by Nishiguchi and Kono")),
        (
            "DK",
            "halpern_kkld",
            "Kanji Learners Dictionary (1999)",
            Some("edited by Jack Halpern (Kodansha)"),
        ),
        (
            "DL",
            "halpern_kkld_2ed",
            "Kanji Learners Dictionary (2013)",
            Some("edited by Jack Halpern (Kodansha)"),
        ),
        ("DM", "maniette", "Les Kanji dans la tête", Some("by Yves Maniette")),
        ("DN", "heisig6", "Remembering The Kanji, 6th Edition", Some("by James Heisig")),
        ("DO", "oneill_kk", "Essential Kanji", Some("by P.G. O'Neill")),
        ("DP", "halpern_kkd", "Kodansha Kanji Dictionary", Some("(2013), by Jack Halpern")),
        ("DR", "deroo", "2001 Kanji", Some("(Bonjinsha), by Father Joseph De Roo")),
        (
            "DS",
            "sakade",
            "A Guide To Reading and Writing Japanese",
            Some("edited by Florence Sakade"),
        ),
        ("DT", "tutt_cards", "Tuttle Kanji Cards", Some("compiled by Alexander Kask")),
        (
            "E",
            "henshall",
            "A Guide To Remembering Japanese Characters",
            Some("by Kenneth G. Henshall"),
        ),
        (
            "K",
            "gakken",
            "A New Dictionary of Kanji Usage",
            Some("by Nao'omi Kuratani, Akemi Kobayashi"),
        ),
        ("L", "heisig", "Remembering The Kanji", Some("by James Heisig")),
        ("O", "oneill_names", "Japanese Names", Some("(1972), by P.G. O'Neill (Weatherhill)")),
        ("M", MOROHASHI, "大漢和辞典", Some("13 volumes, by Morohashi Tetsuji")),
    ];
    SOURCES
        .iter()
        .map(|(code, id, name, citation)| Source {
            code: code.to_string(),
            id: id.to_string(),
            name: name.to_string(),
            citation: citation.map(str::to_string),
        })
        .collect()
}

fn standard_simple_codes() -> Vec<SimpleCode> {
    const CODES: &[(&str, &str, &str)] = &[
        ("B", "classification_radical", "Nelson classification radical (部首)"),
        ("C", "classical_radical", "Classical radical (部首)"),
        ("F", "frequency", "Frequency in newspapers"),
        ("G", "grade", "Grade taught"),
        ("J", "jlpt", "JLPT level"),
        ("Y", "pinyin", "Pinyin"),
        ("W", "hangul", "Hangul"),
        ("P", "skip_code", "SKIP"),
        ("S", keys::STROKES, "Stroke count"),
        ("U", "unicode", "Unicode value"),
        ("Q", "four_corner_index", "\"Four Corner\" index"),
        ("X", keys::CROSSREFERENCE, "Cross-reference code"),
        ("Z", keys::MISCLASSIFICATION, "Mis-classification code"),
    ];
    CODES
        .iter()
        .map(|(code, key, label)| SimpleCode {
            code: code.to_string(),
            key: key.to_string(),
            label: label.to_string(),
        })
        .collect()
}

fn standard_special_codes() -> Vec<SpecialCode> {
    let codes: [(&str, SpecialHandler); 5] = [
        ("T", reading_mode),
        ("M", morohashi),
        ("X", crossreference),
        ("Z", misclassification),
        ("IN", kanji_and_kana),
    ];
    codes
        .into_iter()
        .map(|(code, handler)| SpecialCode {
            code: code.to_string(),
            handler,
        })
        .collect()
}

fn standard_uncoded() -> Vec<(String, String)> {
    [
        (keys::READING, "Reading"),
        (keys::NAME_READING, "Name reading (名乗り)"),
        (keys::RADICAL_NAME, "Radical name"),
        (keys::CHARACTER, "Character"),
        (keys::JIS_CODE, "JIS code"),
        (keys::MEANINGS, "Meaning"),
        (keys::KOKUJI, "Original Japanese character (国字)"),
        (keys::DICTIONARIES, "Dictionaries"),
        (keys::NUMBER, "Number"),
        (keys::PAGE, "Page"),
        (keys::POSITION, "Position"),
        (keys::BOTH, "Stroke count and position"),
        (keys::DISAGREEMENT, "Disagreement over the number of strokes"),
        (keys::UNDEFINED, "undefined"),
    ]
    .into_iter()
    .map(|(key, label)| (key.to_string(), label.to_string()))
    .collect()
}
