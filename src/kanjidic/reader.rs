use log::info;
use std::path::Path;
use std::slice;

use super::codes::CodeRegistry;
use super::format::line;
use super::iter::Entries;
use super::render::Renderer;
use super::types::error::{KanjidicError, Result};
use super::types::models::*;
use super::types::value::Value;
use super::utils;

/// An in-memory KANJIDIC dictionary.
///
/// A `Kanjidic` starts closed. [`open`](Self::open) loads a file,
/// [`expand`](Self::expand) appends another file to the loaded entries and
/// [`close`](Self::close) drops them. Collection operations fail with
/// [`KanjidicError::NotOpen`] while the dictionary is closed.
#[derive(Debug, Default)]
pub struct Kanjidic {
    registry: CodeRegistry,
    entries: Option<Vec<Kanji>>,
}

impl Kanjidic {
    /// A closed dictionary using the standard code registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A closed dictionary using a custom code registry.
    pub fn with_registry(registry: CodeRegistry) -> Self {
        Self {
            registry,
            entries: None,
        }
    }

    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    /// Mutable access to the code registry, e.g. to add codes before loading.
    pub fn registry_mut(&mut self) -> &mut CodeRegistry {
        &mut self.registry
    }

    /// Loads a KANJIDIC file, prefixing every source-encoding identifier with
    /// `scheme`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A dictionary is already open
    /// - The file cannot be read or decoded
    pub fn open(&mut self, path: impl AsRef<Path>, scheme: &str) -> Result<()> {
        self.open_with(path, &LoadOptions::new(scheme))
    }

    pub fn open_with(&mut self, path: impl AsRef<Path>, options: &LoadOptions) -> Result<()> {
        if self.entries.is_some() {
            return Err(KanjidicError::AlreadyOpen);
        }
        let path = path.as_ref();
        let entries = self.load(path, options)?;
        info!("Kanjidic opened: {} entries from {}", entries.len(), path.display());
        self.entries = Some(entries);
        Ok(())
    }

    /// Parses another file and appends its entries to the open dictionary.
    ///
    /// Returns the number of entries added.
    pub fn expand(&mut self, path: impl AsRef<Path>, scheme: &str) -> Result<usize> {
        self.expand_with(path, &LoadOptions::new(scheme))
    }

    pub fn expand_with(&mut self, path: impl AsRef<Path>, options: &LoadOptions) -> Result<usize> {
        if self.entries.is_none() {
            return Err(KanjidicError::NotOpen);
        }
        let path = path.as_ref();
        let added = self.load(path, options)?;
        let count = added.len();
        if let Some(entries) = self.entries.as_mut() {
            entries.extend(added);
            info!(
                "Kanjidic expanded: {} entries from {}, {} in total",
                count,
                path.display(),
                entries.len()
            );
        }
        Ok(count)
    }

    /// Drops every loaded entry.
    pub fn close(&mut self) {
        if let Some(entries) = self.entries.take() {
            info!("Kanjidic closed: {} entries released", entries.len());
        }
    }

    pub fn is_open(&self) -> bool {
        self.entries.is_some()
    }

    /// Parses a whole file without touching the loaded entries.
    pub fn load(&self, path: impl AsRef<Path>, options: &LoadOptions) -> Result<Vec<Kanji>> {
        let path = path.as_ref();
        info!("Parsing KANJIDIC file: {} ({})", path.display(), options.encoding.name());
        let text = utils::read_text(path, options.encoding)?;
        Entries::new(&self.registry, &text, &options.scheme).collect()
    }

    /// Parses a single line. Comment lines yield `None`.
    pub fn parse_line(&self, line: &str, scheme: &str) -> Result<Option<Kanji>> {
        line::parse_line(&self.registry, line, scheme)
    }

    // ---------------------------------------------------------------------
    // Collection operations
    // ---------------------------------------------------------------------

    /// The loaded entries, in file order.
    pub fn entries(&self) -> Result<&[Kanji]> {
        self.entries.as_deref().ok_or(KanjidicError::NotOpen)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.entries()?.is_empty())
    }

    pub fn iter(&self) -> Result<slice::Iter<'_, Kanji>> {
        Ok(self.entries()?.iter())
    }

    /// The first entry matching `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Result<Option<&Kanji>>
    where
        P: FnMut(&Kanji) -> bool,
    {
        Ok(self.entries()?.iter().find(|kanji| predicate(*kanji)))
    }

    /// Every entry matching `predicate`, in file order.
    pub fn filter<P>(&self, mut predicate: P) -> Result<Vec<&Kanji>>
    where
        P: FnMut(&Kanji) -> bool,
    {
        Ok(self.entries()?.iter().filter(|kanji| predicate(*kanji)).collect())
    }

    /// The entry for a character.
    pub fn get(&self, character: &str) -> Result<Option<&Kanji>> {
        self.find(|kanji| kanji.character() == character)
    }

    /// Every entry holding the text `value` under `key`, either directly (as a
    /// single value or within a list) or as a dictionary reference.
    pub fn search(&self, key: &str, value: &str) -> Result<Vec<&Kanji>> {
        let holds = |v: Option<&Value>| v.is_some_and(|v| v.texts().contains(&value));
        self.filter(|kanji| holds(kanji.get(key)) || holds(kanji.dictionary(key)))
    }

    // ---------------------------------------------------------------------
    // Formatting
    // ---------------------------------------------------------------------

    /// A renderer resolving against the loaded entries when open.
    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.registry).with_store(self.entries.as_deref())
    }

    /// Formats one entry; resolution is skipped while closed.
    pub fn format(&self, kanji: &Kanji, options: &FormatOptions) -> String {
        self.renderer().format(kanji, options)
    }

    /// Formats several entries, separated by a line break.
    pub fn format_all(&self, entries: &[Kanji], options: &FormatOptions) -> String {
        self.renderer().format_all(entries, options)
    }
}
