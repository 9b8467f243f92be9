//! Navigation label normalization.
//!
//! [`Normalizer::normalize`] corrects the capitalization of a label in four
//! steps after an exact dictionary lookup:
//!
//! 1. canonical values already present in the text are shielded behind
//!    placeholder tokens,
//! 2. dictionary keys (space and dash interchangeable) are replaced by
//!    placeholders carrying their canonical value,
//! 3. whatever text is left is title-cased,
//! 4. placeholders are restored in index order.
//!
//! Placeholders are built from private-use characters, which are not word
//! characters, so later passes never match inside a shielded span.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::dictionary::{DictionaryError, TermDictionary};
use crate::util::title_case;

const SLOT_OPEN: char = '\u{E000}';
const SLOT_CLOSE: char = '\u{E001}';
/// Digits of a slot index are shifted into the private-use area.
const SLOT_DIGIT_BASE: u32 = 0xE010;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    #[error("invalid dictionary: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("failed to compile pattern for '{term}': {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },
}

// =============================================================================
// Precedence
// =============================================================================

/// The order in which patterns are tried within each matching pass.
///
/// When one span could match several entries, the first pattern to claim it
/// wins. Values are always shielded before keys are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// Longer patterns first, ties in dictionary order.
    #[default]
    LongestFirst,
    /// Dictionary order only.
    DictionaryOrder,
}

// =============================================================================
// Normalizer
// =============================================================================

/// A compiled matching rule: a whole-word pattern and the value it yields.
#[derive(Debug)]
struct Rule {
    pattern: Regex,
    value: String,
}

/// Corrects navigation label capitalization against a term dictionary.
///
/// Build once and share; all patterns are compiled up front.
#[derive(Debug)]
pub struct Normalizer {
    dictionary: TermDictionary,
    precedence: Precedence,
    /// Pass 1: canonical values matched verbatim (case-insensitive).
    protect: Vec<Rule>,
    /// Pass 2: keys with interchangeable space/dash separators.
    keys: Vec<Rule>,
}

impl Normalizer {
    pub fn new(
        dictionary: TermDictionary,
        precedence: Precedence,
    ) -> Result<Self, NormalizeError> {
        let mut protect = Vec::new();
        for value in dictionary.values() {
            let rule = compile_rule(value, &regex::escape(value), value)?;
            protect.push((value.chars().count(), rule));
        }

        let mut keys = Vec::new();
        for term in dictionary.terms() {
            let pattern = term
                .key
                .split([' ', '-'])
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("[- ]");
            let rule = compile_rule(&term.key, &pattern, &term.value)?;
            keys.push((term.key.chars().count(), rule));
        }

        Ok(Self {
            protect: order(protect, precedence),
            keys: order(keys, precedence),
            dictionary,
            precedence,
        })
    }

    /// A normalizer over the built-in term table.
    pub fn builtin() -> Result<Self, NormalizeError> {
        Self::new(TermDictionary::builtin()?, Precedence::default())
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Correct the capitalization of a label.
    ///
    /// Returns the input unchanged when it is empty or whitespace. Otherwise
    /// the result is built from the trimmed input; text containing the
    /// private-use slot markers is only trimmed unless it is a known term.
    pub fn normalize(&self, input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return input.to_string();
        }

        if let Some(value) = self.dictionary.lookup(trimmed) {
            return value.to_string();
        }

        // Text that already holds slot characters (icon font glyphs) could
        // not be told apart from real slots on restore.
        if trimmed.contains([SLOT_OPEN, SLOT_CLOSE]) {
            return trimmed.to_string();
        }

        let mut slots: Vec<&str> = Vec::new();
        let mut working = trimmed.to_string();

        for rule in self.protect.iter().chain(&self.keys) {
            if !rule.pattern.is_match(&working) {
                continue;
            }
            working = rule
                .pattern
                .replace_all(&working, |_: &Captures<'_>| {
                    slots.push(&rule.value);
                    slot_token(slots.len() - 1)
                })
                .into_owned();
        }

        let mut result = title_case(&working);
        for (index, value) in slots.iter().enumerate() {
            result = result.replacen(&slot_token(index), value, 1);
        }

        result
    }
}

/// A spelling of a term that did not normalize to its canonical value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub input: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' normalized to '{}', expected '{}'",
            self.input, self.actual, self.expected
        )
    }
}

impl Normalizer {
    /// Check that every term resolves to its value when spelled as its key,
    /// its uppercased key, its dashed key, or the value itself.
    pub fn verify(&self) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();

        for term in self.dictionary.terms() {
            let mut spellings = vec![term.key.clone(), term.key.to_uppercase(), term.value.clone()];
            spellings.extend(term.dash_variant());

            for input in spellings {
                let actual = self.normalize(&input);
                if actual != term.value {
                    mismatches.push(Mismatch {
                        input,
                        expected: term.value.clone(),
                        actual,
                    });
                }
            }
        }

        mismatches
    }
}

/// Compile a case-insensitive whole-word rule.
///
/// A word boundary is only required on a side whose edge character is a word
/// character; punctuation edges already delimit themselves.
fn compile_rule(term: &str, escaped: &str, value: &str) -> Result<Rule, NormalizeError> {
    let leading = if term.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let trailing = if term.chars().next_back().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };

    let pattern = Regex::new(&format!("(?i){leading}(?:{escaped}){trailing}")).map_err(
        |source| NormalizeError::Pattern {
            term: term.to_string(),
            source,
        },
    )?;

    Ok(Rule {
        pattern,
        value: value.to_string(),
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Sort rules by precedence. The sort is stable, so ties keep dictionary order.
fn order(mut rules: Vec<(usize, Rule)>, precedence: Precedence) -> Vec<Rule> {
    if precedence == Precedence::LongestFirst {
        rules.sort_by(|(a, _), (b, _)| b.cmp(a));
    }
    rules.into_iter().map(|(_, rule)| rule).collect()
}

/// The placeholder token for a slot index.
fn slot_token(index: usize) -> String {
    let mut token = String::new();
    token.push(SLOT_OPEN);
    for digit in index.to_string().chars() {
        let offset = digit.to_digit(10).unwrap_or(0);
        token.extend(char::from_u32(SLOT_DIGIT_BASE + offset));
    }
    token.push(SLOT_CLOSE);
    token
}
