//! Resolving a config into runtime objects.
//!
//! The dictionary, normalizer and fixer are built once per process from the
//! loaded config and shared from there.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Config, ConfigError};
use crate::dictionary::TermDictionary;
use crate::dom::{NavFixer, NavSelectors};
use crate::normalize::Normalizer;

impl Config {
    /// The term dictionary: built-in table (unless disabled) plus configured terms.
    pub fn dictionary(&self) -> Result<TermDictionary, ConfigError> {
        let base = if self.builtin_terms {
            TermDictionary::builtin()?
        } else {
            TermDictionary::empty()
        };

        Ok(base.with_overrides(self.terms.iter().cloned())?)
    }

    pub fn normalizer(&self) -> Result<Normalizer, ConfigError> {
        Ok(Normalizer::new(self.dictionary()?, self.precedence)?)
    }

    pub fn fixer(&self) -> Result<NavFixer, ConfigError> {
        let selectors = NavSelectors::new(self.selectors.iter().cloned())?;
        Ok(NavFixer::new(Arc::new(self.normalizer()?), selectors))
    }

    /// The site output directory, resolved against the config file's directory.
    pub fn site_dir(&self, base_path: &Path) -> PathBuf {
        if self.site.output.is_relative() {
            base_path.join(&self.site.output)
        } else {
            self.site.output.clone()
        }
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Term;

    #[test]
    fn test_configured_terms_extend_builtin() {
        let config = Config {
            terms: vec![Term::new("fms", "FMS"), Term::new("rapid", "RapiD")],
            ..Config::default()
        };

        let normalizer = config.normalizer().unwrap();
        assert_eq!(normalizer.normalize("fms reports"), "FMS Reports");
        assert_eq!(normalizer.normalize("rapid"), "RapiD");
        assert_eq!(normalizer.normalize("tcat wiki"), "TCAT Wiki");
    }

    #[test]
    fn test_builtin_terms_can_be_disabled() {
        let config = Config {
            builtin_terms: false,
            terms: vec![Term::new("fms", "FMS")],
            ..Config::default()
        };

        let dictionary = config.dictionary().unwrap();
        assert_eq!(dictionary.len(), 1);
        assert_eq!(config.normalizer().unwrap().normalize("tcat wiki"), "Tcat Wiki");
    }

    #[test]
    fn test_conflicting_terms_are_rejected() {
        let config = Config {
            terms: vec![Term::new("user-manual", "User-Manual")],
            ..Config::default()
        };

        assert!(matches!(
            config.dictionary(),
            Err(ConfigError::Dictionary(_))
        ));
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let config = Config {
            selectors: vec!["a[[".to_string()],
            ..Config::default()
        };

        assert!(matches!(config.fixer(), Err(ConfigError::Selectors(_))));
    }

    #[test]
    fn test_site_dir() {
        let config = Config::default();
        assert_eq!(
            config.site_dir(Path::new("/docs")),
            PathBuf::from("/docs/site")
        );
        assert_eq!(
            base_path_from_config(Path::new("/docs/navcase.yaml")),
            PathBuf::from("/docs")
        );
    }
}
