//! The composite element pattern.
//!
//! One regex classifies every element of a line. Its alternatives are tried in
//! this order, and only the first match in a token counts:
//!
//! ```text
//! (CODE|...)([A-Z]{0,2})(.+)   coded attribute   -> 3 groups (code, subcode, value)
//! (\{)(.*)\}                   bracketed text    -> 2 groups ("{", content)
//! ([^0-9A-Za-z_]+)             anything else     -> 1 group  (reading)
//! ```
//!
//! Codes are listed longest first so that a two-letter code (`IN`) is never
//! shadowed by a one-letter code sharing its first letter (`I`).

use log::trace;
use regex::Regex;

use crate::kanjidic::types::error::{KanjidicError, Result};

/// A classified line element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'t> {
    /// A bare token, stored under the current reading mode.
    Reading(&'t str),
    /// The content of a `{...}` token.
    Meaning(&'t str),
    /// A letter code with its optional subcode and its value.
    Coded {
        code: &'t str,
        subcode: &'t str,
        value: &'t str,
    },
}

/// The compiled matcher for line elements.
#[derive(Debug, Clone)]
pub struct ElementPattern {
    regex: Regex,
}

impl ElementPattern {
    /// Compiles the pattern for the given codes.
    pub fn build<'a>(codes: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut codes: Vec<&str> = codes.into_iter().filter(|c| !c.is_empty()).collect();
        // Stable: codes of equal length keep catalog order.
        codes.sort_by(|a, b| b.len().cmp(&a.len()));

        let alternation = if codes.is_empty() {
            // Matches nothing.
            r"\b\B".to_string()
        } else {
            codes
                .iter()
                .map(|c| regex::escape(c))
                .collect::<Vec<_>>()
                .join("|")
        };
        let source = format!(r"({})([A-Z]{{0,2}})(.+)|(\{{)(.*)\}}|([^0-9A-Za-z_]+)", alternation);
        trace!("Compiling element pattern: {}", source);

        Ok(Self {
            regex: Regex::new(&source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Classifies one token.
    ///
    /// Returns `Ok(None)` when nothing in the token matches. A match whose shape
    /// is not one of the three alternatives is an internal consistency error.
    pub fn classify<'t>(&self, token: &'t str) -> Result<Option<Element<'t>>> {
        let Some(caps) = self.regex.captures(token) else {
            return Ok(None);
        };
        let groups: Vec<&'t str> = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect();

        match *groups.as_slice() {
            [reading] => Ok(Some(Element::Reading(reading))),
            [_, content] => Ok(Some(Element::Meaning(content))),
            [code, subcode, value] => Ok(Some(Element::Coded {
                code,
                subcode,
                value,
            })),
            _ => Err(KanjidicError::InternalConsistency(format!(
                "token {:?} matched with {} groups",
                token,
                groups.len()
            ))),
        }
    }
}
