//! Editor configuration loading.
//!
//! # Responsibility
//! - Read the JSON editor configuration with defaults for missing keys.
//! - Reject values the runtime cannot honor before anything starts.
//!
//! # Invariants
//! - A returned [`EditorConfig`] has passed [`EditorConfig::validate`].

use crate::autosave::coordinator::{AutoSaveConfig, DEFAULT_AUTOSAVE_INTERVAL};
use crate::logging::{default_log_level, parse_level};
use crate::metrics::lexicon::Locale;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoSaveSettings {
    pub interval_ms: u64,
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            interval_ms: u64::try_from(DEFAULT_AUTOSAVE_INTERVAL.as_millis()).unwrap_or(30_000),
        }
    }
}

impl AutoSaveSettings {
    pub fn to_coordinator_config(&self) -> AutoSaveConfig {
        AutoSaveConfig {
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub autosave: AutoSaveSettings,
    /// Language of the emotional/interrogative lexicon.
    pub locale: Locale,
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave: AutoSaveSettings::default(),
            locale: Locale::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl EditorConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autosave.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "autosave.intervalMs must be greater than zero".to_string(),
            ));
        }
        parse_level(&self.log_level)
            .map_err(|err| ConfigError::Invalid(format!("logLevel: {err}")))?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Loads and validates the configuration file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<EditorConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    EditorConfig::from_json(&raw)
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, EditorConfig};
    use crate::metrics::lexicon::Locale;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn empty_object_uses_defaults() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config.autosave.interval_ms, 30_000);
        assert_eq!(config.locale, Locale::Tr);
        assert_eq!(
            config.autosave.to_coordinator_config().interval,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            EditorConfig::from_json(r#"{"autosave":{"intervalMs":5000},"locale":"en"}"#).unwrap();
        assert_eq!(config.autosave.interval_ms, 5_000);
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = EditorConfig::from_json(r#"{"autosave":{"intervalMs":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = EditorConfig::from_json(r#"{"logLevel":"loud"}"#).unwrap_err();
        assert!(err.to_string().contains("logLevel"));
    }

    #[test]
    fn load_config_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"logLevel":"warn"}}"#).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.log_level, "warn");

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            load_config(missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
