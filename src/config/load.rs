//! Configuration loading from files and the environment.
//!
//! The YAML file is optional. Environment variables prefixed with
//! `NAVCASE__` override it, using `__` to separate nested keys
//! (`NAVCASE__SITE__OUTPUT=public`).

use std::path::Path;

use ::config::{Environment, File, FileFormat, Map};

use super::{Config, ConfigError};
use crate::dom::NavSelectors;

impl Config {
    /// Load the config from the command line argument, defaulting to `navcase.yaml`
    pub async fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new("navcase.yaml"));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file)
    }

    /// Load the config from a file path, falling back to defaults when the
    /// file does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_layers(path, None)
    }

    /// Load the file, then overlay `NAVCASE__` variables from `env`, or from
    /// the process environment when `env` is `None`.
    fn load_layers(path: &Path, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix("NAVCASE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        tracing::debug!(path = %path.display(), terms = config.terms.len(), "loaded config");
        Ok(config)
    }

    /// Check settings that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        NavSelectors::new(self.selectors.iter().cloned())?;
        if self.triggers.fallback_ticks > 0 && self.triggers.fallback_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "'triggers.fallback_interval_ms' must be greater than zero".to_string(),
            ));
        }
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "'watch.debounce_ms' must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomError;
    use crate::normalize::Precedence;

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("navcase.yaml")).unwrap();

        assert!(config.builtin_terms);
        assert_eq!(config.site.output, Path::new("site"));
        assert_eq!(config.selectors.len(), 5);
        assert_eq!(config.triggers.fallback_ticks, 20);
        assert_eq!(config.precedence, Precedence::LongestFirst);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navcase.yaml");
        std::fs::write(
            &path,
            r#"
site:
  output: public
terms:
  - key: fms
    value: FMS
  - key: rapid
    value: RapiD
precedence: dictionary-order
selectors: [".nav-link"]
triggers:
  initial_delays_ms: [50]
  fallback_ticks: 4
watch:
  poll: true
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.site.output, Path::new("public"));
        assert_eq!(config.terms.len(), 2);
        assert_eq!(config.terms[1].value, "RapiD");
        assert_eq!(config.precedence, Precedence::DictionaryOrder);
        assert_eq!(config.selectors, vec![".nav-link".to_string()]);
        assert_eq!(config.triggers.initial_delays_ms, vec![50]);
        assert_eq!(config.triggers.fallback_ticks, 4);
        assert_eq!(config.triggers.frame_ms, 16);
        assert!(config.watch.poll);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_rejects_empty_selectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navcase.yaml");
        std::fs::write(&path, "selectors: []\n").unwrap();

        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Selectors(DomError::NoSelectors))
        ));
    }

    #[test]
    fn test_rejects_invalid_selector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navcase.yaml");
        std::fs::write(&path, "selectors: [\"a[[\"]\n").unwrap();

        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Selectors(DomError::Selector { .. }))
        ));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navcase.yaml");
        std::fs::write(
            &path,
            "site:\n  output: site\ntriggers:\n  fallback_ticks: 20\n  frame_ms: 32\n",
        )
        .unwrap();

        let config = Config::load_layers(
            &path,
            env(&[
                ("NAVCASE__SITE__OUTPUT", "public"),
                ("NAVCASE__TRIGGERS__FALLBACK_TICKS", "3"),
                ("NAVCASE__BUILTIN_TERMS", "false"),
                ("OTHER__SITE__OUTPUT", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.site.output, Path::new("public"));
        assert_eq!(config.triggers.fallback_ticks, 3);
        assert_eq!(config.triggers.frame_ms, 32);
        assert!(!config.builtin_terms);
    }

    #[test]
    fn test_environment_values_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navcase.yaml");

        let result = Config::load_layers(&path, env(&[("NAVCASE__WATCH__DEBOUNCE_MS", "0")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("navcase.yaml");
        std::fs::write(&path, "precedence: sideways\n").unwrap();

        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::Load(_))
        ));
    }
}
