//! Human-readable rendering of entries, with cross-reference resolution.
//!
//! Every rendered key takes one line, `Label: value`. Nested maps continue on
//! the following lines, indented two spaces per level:
//!
//! ```text
//! Character: 亜
//! Reading: ア, つ.ぐ
//! Cross-reference code:
//!   JIS code: 1F6D (亞)
//! ```
//!
//! Values under a resolvable key (cross-references and mis-classifications)
//! are looked up in the loaded entries; the character of the first other
//! entry holding the same value is appended in parentheses.

use std::fmt::{self, Write};

use super::codes::CodeRegistry;
use super::types::models::{keys, FormatOptions, Kanji, Visibility};
use super::types::value::Value;

/// Keys whose values are resolved against the loaded entries.
const RESOLVABLE: &[&str] = &[keys::CROSSREFERENCE, keys::MISCLASSIFICATION];

/// Formats entries using a registry for labels and, optionally, loaded
/// entries for resolution.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    registry: &'a CodeRegistry,
    store: Option<&'a [Kanji]>,
}

impl<'a> Renderer<'a> {
    /// A renderer without resolution.
    pub fn new(registry: &'a CodeRegistry) -> Self {
        Self {
            registry,
            store: None,
        }
    }

    /// Resolves against `store`; `None` disables resolution.
    pub fn with_store(mut self, store: Option<&'a [Kanji]>) -> Self {
        self.store = store;
        self
    }

    /// Formats several entries, separated by a line break.
    pub fn format_all(&self, entries: &[Kanji], options: &FormatOptions) -> String {
        entries
            .iter()
            .map(|kanji| self.format(kanji, options))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats one entry.
    ///
    /// Ranked keys come first, by rank; hidden keys are skipped; every other
    /// key follows in the entry's own order.
    pub fn format(&self, kanji: &Kanji, options: &FormatOptions) -> String {
        let visibility = options.resolved();

        let mut ranked: Vec<(&str, u32)> = visibility
            .iter()
            .filter_map(|(key, v)| match v {
                Visibility::Rank(rank) => Some((key.as_str(), *rank)),
                Visibility::Hidden => None,
            })
            .collect();
        ranked.sort_by_key(|(_, rank)| *rank);

        let mut out = String::new();
        for (key, _) in ranked {
            if let Some(value) = kanji.get(key) {
                self.write_pair(&mut out, kanji, key, value, 1, false);
            }
        }
        for (key, value) in kanji.iter() {
            if !visibility.contains_key(key) {
                self.write_pair(&mut out, kanji, key, value, 1, false);
            }
        }
        out
    }

    fn write_pair(
        &self,
        out: &mut String,
        origin: &Kanji,
        key: &str,
        value: &Value,
        nesting: usize,
        resolve: bool,
    ) {
        let resolve = resolve || RESOLVABLE.contains(&key);
        let label = self.registry.label(key).unwrap_or(key);
        // Writing to a String cannot fail.
        let _ = write!(out, "{}:", label);

        match value {
            Value::Map(fields) => {
                out.push('\n');
                for (k, v) in fields {
                    out.push_str(&"  ".repeat(nesting));
                    self.write_pair(out, origin, k, v, nesting + 1, resolve);
                }
            }
            Value::List(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| {
                        let annotation = self.annotation(origin, key, item, resolve);
                        format!("{}{}", item, annotation)
                    })
                    .collect();
                let _ = writeln!(out, " {}", rendered.join(", "));
            }
            scalar => {
                let annotation = self.annotation(origin, key, scalar, resolve);
                let _ = writeln!(out, " {}{}", scalar, annotation);
            }
        }
    }

    /// ` (X)` where X is the character of the entry holding `value` under
    /// `key`, directly or among its dictionary references. Entries equal to
    /// `origin` are skipped.
    fn annotation(
        &self,
        origin: &Kanji,
        key: &str,
        value: &Value,
        resolve: bool,
    ) -> Annotation<'a> {
        if !resolve {
            return Annotation(None);
        }
        let Some(store) = self.store else {
            return Annotation(None);
        };
        let hit = store.iter().find(|candidate| {
            (candidate.get(key) == Some(value) || candidate.dictionary(key) == Some(value))
                && *candidate != origin
        });
        Annotation(hit.map(Kanji::character))
    }
}

struct Annotation<'a>(Option<&'a str>);

impl fmt::Display for Annotation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(character) => write!(f, " ({})", character),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Kanji {
    /// The summary view, without resolution.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Renderer::new(CodeRegistry::shared()).format(self, &FormatOptions::summary());
        f.write_str(text.trim_end())
    }
}
