//! Taxonomy configuration, persisted as TOML.
//!
//! ```toml
//! strategy = "materialized"
//! progress_every = 500
//! profile_path = "profiles/strict.toml"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TaxoResult};
use crate::graph::closure::ClosureStrategy;
use crate::graph::profile::ConstraintProfile;

/// Per-taxonomy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Whether closures are computed on read or precomputed by `materialize()`.
    #[serde(default)]
    pub strategy: ClosureStrategy,
    /// Bulk import emits a progress notice after this many edges.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
    /// External constraint profile; the built-in table is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
}

fn default_progress_every() -> usize {
    1_000
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            strategy: ClosureStrategy::default(),
            progress_every: default_progress_every(),
            profile_path: None,
        }
    }
}

impl TaxonomyConfig {
    /// Check field values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_every == 0 {
            return Err(ConfigError::Invalid {
                message: "progress_every must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// The constraint profile this configuration selects.
    pub fn profile(&self) -> TaxoResult<ConstraintProfile> {
        match &self.profile_path {
            Some(path) => Ok(ConstraintProfile::load(path)?),
            None => Ok(ConstraintProfile::builtin()),
        }
    }

    /// Parse from a TOML string; `origin` names the source in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. A relative `profile_path` is resolved against
    /// the config file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config = Self::from_toml_str(&content, &path.display().to_string())?;
        if let (Some(profile), Some(dir)) = (&config.profile_path, path.parent()) {
            if profile.is_relative() {
                config.profile_path = Some(dir.join(profile));
            }
        }
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = TaxonomyConfig::from_toml_str("", "inline").unwrap();
        assert_eq!(config, TaxonomyConfig::default());
        assert_eq!(config.strategy, ClosureStrategy::OnDemand);
        assert_eq!(config.progress_every, 1_000);
    }

    #[test]
    fn parses_strategy_and_rejects_zero_interval() {
        let content = "strategy = \"materialized\"\nprogress_every = 5";
        let config = TaxonomyConfig::from_toml_str(content, "inline").unwrap();
        assert_eq!(config.strategy, ClosureStrategy::Materialized);
        assert_eq!(config.progress_every, 5);

        assert!(matches!(
            TaxonomyConfig::from_toml_str("progress_every = 0", "inline"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            TaxonomyConfig::from_toml_str("strategy = \"eager\"", "inline"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("taxonomy.toml");
        let config = TaxonomyConfig {
            strategy: ClosureStrategy::Materialized,
            progress_every: 10,
            profile_path: None,
        };
        config.save(&path).unwrap();
        assert_eq!(TaxonomyConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn relative_profile_path_resolves_next_to_config() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("profile.toml"), "[[rule]]\nkind = \"Related\"\n").unwrap();
        let path = dir.path().join("taxonomy.toml");
        std::fs::write(&path, "profile_path = \"profile.toml\"\n").unwrap();

        let config = TaxonomyConfig::load(&path).unwrap();
        assert_eq!(config.profile_path, Some(dir.path().join("profile.toml")));
        assert_eq!(config.profile().unwrap().len(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            TaxonomyConfig::load(&dir.path().join("absent.toml")),
            Err(ConfigError::Read { .. })
        ));
        assert_eq!(TaxonomyConfig::default().profile().unwrap(), ConstraintProfile::builtin());
    }
}
