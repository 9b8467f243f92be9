//! Term dictionary for navigation labels.
//!
//! Maps lowercase phrases to their canonical display form. Every key that
//! contains a space also answers to its dash-separated twin, so
//! "user manual" and "user-manual" both resolve to "User Manual".
//!
//! The dictionary is validated when it is built: keys must be lowercase and
//! unique, and the expanded lookup (keys plus dash variants) must never map
//! one phrase to two different values.

mod builtin;

use std::collections::HashMap;
use std::iter;

use serde::{Deserialize, Serialize};

use builtin::BUILTIN_TERMS;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("term key is empty")]
    EmptyKey,

    #[error("term '{0}' has an empty value")]
    EmptyValue(String),

    #[error("term key '{0}' has leading or trailing whitespace")]
    UntrimmedKey(String),

    #[error("term key '{0}' is not lowercase")]
    NotLowercase(String),

    #[error("term key '{0}' is defined more than once")]
    DuplicateKey(String),

    #[error("'{key}' maps to both '{existing}' and '{incoming}'")]
    Conflict {
        key: String,
        existing: String,
        incoming: String,
    },
}

// =============================================================================
// Terms
// =============================================================================

/// A single dictionary entry: a lowercase phrase and its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Lowercase, space-separated phrase.
    pub key: String,
    /// Correctly capitalized display string.
    pub value: String,
}

impl Term {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The dash-separated twin of a multi-word key.
    pub fn dash_variant(&self) -> Option<String> {
        self.key
            .contains(' ')
            .then(|| self.key.replace(' ', "-"))
    }

    fn validate(&self) -> Result<(), DictionaryError> {
        if self.key.trim().is_empty() {
            return Err(DictionaryError::EmptyKey);
        }
        if self.key.trim() != self.key {
            return Err(DictionaryError::UntrimmedKey(self.key.clone()));
        }
        if self.key.to_lowercase() != self.key {
            return Err(DictionaryError::NotLowercase(self.key.clone()));
        }
        if self.value.trim().is_empty() {
            return Err(DictionaryError::EmptyValue(self.key.clone()));
        }
        Ok(())
    }
}

// =============================================================================
// Dictionary
// =============================================================================

/// An immutable, validated term dictionary.
///
/// Terms keep the order they were given in; that order is the tie-breaker
/// for the normalizer's matching passes.
#[derive(Debug, Clone)]
pub struct TermDictionary {
    terms: Vec<Term>,
    /// Keys and dash variants -> index into `terms`.
    lookup: HashMap<String, usize>,
}

impl TermDictionary {
    /// Build a dictionary from terms, validating every entry.
    pub fn new<I>(terms: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = Term>,
    {
        let mut dictionary = Self {
            terms: Vec::new(),
            lookup: HashMap::new(),
        };

        for term in terms {
            term.validate()?;
            dictionary.insert(term)?;
        }

        Ok(dictionary)
    }

    /// The built-in term table.
    pub fn builtin() -> Result<Self, DictionaryError> {
        Self::new(
            BUILTIN_TERMS
                .iter()
                .map(|(key, value)| Term::new(*key, *value)),
        )
    }

    /// An empty dictionary. Every label falls through to title case.
    pub fn empty() -> Self {
        Self {
            terms: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Merge overrides into this dictionary.
    ///
    /// An override whose key already exists replaces that entry's value in
    /// place; new keys are appended. Later overrides win over earlier ones.
    pub fn with_overrides<I>(self, overrides: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = Term>,
    {
        let mut terms = self.terms;

        for term in overrides {
            term.validate()?;
            match terms.iter_mut().find(|existing| existing.key == term.key) {
                Some(existing) => existing.value = term.value,
                None => terms.push(term),
            }
        }

        Self::new(terms)
    }

    fn insert(&mut self, term: Term) -> Result<(), DictionaryError> {
        if let Some(&index) = self.lookup.get(&term.key)
            && self.terms[index].key == term.key
        {
            return Err(DictionaryError::DuplicateKey(term.key));
        }

        let variant = term.dash_variant();
        let names = || iter::once(term.key.as_str()).chain(variant.as_deref());

        for name in names() {
            if let Some(&index) = self.lookup.get(name)
                && self.terms[index].value != term.value
            {
                return Err(DictionaryError::Conflict {
                    key: name.to_string(),
                    existing: self.terms[index].value.clone(),
                    incoming: term.value.clone(),
                });
            }
        }

        let index = self.terms.len();
        for name in names() {
            self.lookup.entry(name.to_string()).or_insert(index);
        }
        self.terms.push(term);

        Ok(())
    }

    /// Look up a phrase exactly (case-insensitive, dash variants included).
    pub fn lookup(&self, phrase: &str) -> Option<&str> {
        self.lookup
            .get(&phrase.trim().to_lowercase())
            .map(|&index| self.terms[index].value.as_str())
    }

    /// All terms in dictionary order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Distinct canonical values in dictionary order.
    pub fn values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            if !values.contains(&term.value.as_str()) {
                values.push(&term.value);
            }
        }
        values
    }

    /// The expanded lookup as (phrase, value) pairs, each key followed by
    /// its dash variant.
    pub fn expanded(&self) -> Vec<(String, &str)> {
        self.terms
            .iter()
            .flat_map(|term| {
                iter::once(term.key.clone())
                    .chain(term.dash_variant())
                    .map(move |name| (name, term.value.as_str()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(entries: &[(&str, &str)]) -> Result<TermDictionary, DictionaryError> {
        TermDictionary::new(entries.iter().map(|(k, v)| Term::new(*k, *v)))
    }

    #[test]
    fn test_builtin_table_is_valid() {
        let dictionary = TermDictionary::builtin().unwrap();
        assert_eq!(dictionary.len(), BUILTIN_TERMS.len());
        assert_eq!(dictionary.lookup("tcat wiki"), Some("TCAT Wiki"));
        assert_eq!(dictionary.lookup("tcat-wiki"), Some("TCAT Wiki"));
        assert_eq!(dictionary.lookup("iOS"), Some("iOS"));
    }

    #[test]
    fn test_dash_variants() {
        let dictionary = dict(&[("user manual", "User Manual"), ("api", "API")]).unwrap();

        assert_eq!(dictionary.lookup("user-manual"), Some("User Manual"));
        assert_eq!(dictionary.lookup("USER MANUAL"), Some("User Manual"));
        assert_eq!(dictionary.lookup("api"), Some("API"));
        assert_eq!(dictionary.lookup("a-p-i"), None);

        let expanded = dictionary.expanded();
        assert_eq!(
            expanded,
            vec![
                ("user manual".to_string(), "User Manual"),
                ("user-manual".to_string(), "User Manual"),
                ("api".to_string(), "API"),
            ]
        );
    }

    #[test]
    fn test_rejects_invalid_keys() {
        assert_eq!(dict(&[("", "X")]).unwrap_err(), DictionaryError::EmptyKey);
        assert_eq!(
            dict(&[(" api", "API")]).unwrap_err(),
            DictionaryError::UntrimmedKey(" api".into())
        );
        assert_eq!(
            dict(&[("Api", "API")]).unwrap_err(),
            DictionaryError::NotLowercase("Api".into())
        );
        assert_eq!(
            dict(&[("api", " ")]).unwrap_err(),
            DictionaryError::EmptyValue("api".into())
        );
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let err = dict(&[("api", "API"), ("api", "API")]).unwrap_err();
        assert_eq!(err, DictionaryError::DuplicateKey("api".into()));
    }

    #[test]
    fn test_rejects_conflicting_dash_variant() {
        let err = dict(&[("log-in", "Log-In"), ("log in", "Log In")]).unwrap_err();
        assert_eq!(
            err,
            DictionaryError::Conflict {
                key: "log-in".into(),
                existing: "Log-In".into(),
                incoming: "Log In".into(),
            }
        );
    }

    #[test]
    fn test_agreeing_dash_variant_is_allowed() {
        let dictionary = dict(&[("log-in", "Log In"), ("log in", "Log In")]).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.lookup("log-in"), Some("Log In"));
    }

    #[test]
    fn test_overrides_replace_in_place_and_append() {
        let dictionary = dict(&[("api", "API"), ("rapid", "Rapid")])
            .unwrap()
            .with_overrides([Term::new("rapid", "RapiD"), Term::new("fms", "FMS")])
            .unwrap();

        let keys: Vec<&str> = dictionary.terms().iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["api", "rapid", "fms"]);
        assert_eq!(dictionary.lookup("rapid"), Some("RapiD"));
        assert_eq!(dictionary.lookup("fms"), Some("FMS"));
    }

    #[test]
    fn test_values_are_distinct_and_ordered() {
        let dictionary = dict(&[("walkshed", "Walksheds"), ("walksheds", "Walksheds"), ("a", "a")])
            .unwrap();
        assert_eq!(dictionary.values(), vec!["Walksheds", "a"]);
    }
}
