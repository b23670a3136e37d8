//! Line tokenizing and classification.
//!
//! A data line is
//!
//! ```text
//! <character> <source encoding> <element>*
//! ```
//!
//! where each element is a `{bracketed text}`, a coded attribute or a bare
//! reading. Lines starting with an ASCII character are headers or comments.

use log::{debug, trace};
use regex::Regex;
use std::sync::OnceLock;

use super::merge::merge;
use super::pattern::Element;
use crate::kanjidic::codes::CodeRegistry;
use crate::kanjidic::types::error::{KanjidicError, Result};
use crate::kanjidic::types::models::{keys, Kanji, ReadingMode};
use crate::kanjidic::types::value::{entry, Fields, Value};

/// Bracket groups are kept whole, everything else splits on whitespace.
static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| Regex::new(r"\{[^}]+\}|\S+").expect("Invalid token regex pattern"))
}

const KOKUJI_MARK: &str = "(kokuji)";

/// Splits a line into its elements.
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    token_regex().find_iter(line).map(|m| m.as_str())
}

/// Whether a line holds an entry. Anything not starting with a non-ASCII
/// character (supposedly a kanji) is treated as a comment.
pub fn is_data_line(line: &str) -> bool {
    line.chars().next().is_some_and(|c| !c.is_ascii())
}

/// Parses one line into an entry.
///
/// Returns `Ok(None)` for comment and header lines. Malformed elements never
/// fail the line; they are kept under `undefined`.
pub fn parse_line(registry: &CodeRegistry, line: &str, scheme: &str) -> Result<Option<Kanji>> {
    if !is_data_line(line) {
        debug!("Skipping non-data line: {:?}", line.trim_end());
        return Ok(None);
    }

    let mut tokens = tokenize(line);
    let character = tokens.next().unwrap_or_default();
    let jis_code = format!("{}{}", scheme, tokens.next().unwrap_or_default());
    let mut kanji = Kanji::new(character, jis_code);

    tokens.try_fold(ReadingMode::default(), |mode, token| {
        let (partial, next_mode) = classify_token(registry, token, mode)?;
        merge(kanji.fields_mut(), partial);
        Ok::<_, KanjidicError>(next_mode)
    })?;

    Ok(Some(kanji))
}

/// Classifies one token under the current reading mode.
///
/// Returns the partial entry to merge and the reading mode for the next token.
pub fn classify_token(
    registry: &CodeRegistry,
    token: &str,
    mode: ReadingMode,
) -> Result<(Fields, ReadingMode)> {
    let element = registry.pattern()?.classify(token)?;
    trace!("{:?} -> {:?}", token, element);

    let mut next_mode = mode;
    let partial = match element {
        None => {
            debug!("Unrecognized element {:?}, keeping it as undefined", token);
            entry(keys::UNDEFINED, token)
        }
        Some(Element::Reading(reading)) => entry(mode.key(), reading),
        Some(Element::Meaning(meaning)) => {
            let mut partial = entry(keys::MEANINGS, meaning);
            if meaning == KOKUJI_MARK {
                partial.insert(keys::KOKUJI.to_string(), Value::Flag(true));
            }
            partial
        }
        Some(Element::Coded { code, subcode, value }) => registry
            .codes()
            .dispatch(code, subcode, value, &mut next_mode)
            .ok_or_else(|| {
                KanjidicError::InternalConsistency(format!(
                    "code {:?} matched the element pattern but has no handler",
                    code
                ))
            })?,
    };

    Ok((partial, next_mode))
}
