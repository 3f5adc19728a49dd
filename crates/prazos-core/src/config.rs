use crate::classifier::Thresholds;
use crate::error::{PrazoError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// AuditTarget
// ---------------------------------------------------------------------------

/// Where audit events go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTarget {
    /// The `audit` table of the case database.
    #[default]
    Store,
    /// The `prazos::audit` tracing target only.
    Log,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub audit: AuditTarget,
}

fn default_database() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DATABASE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            database: default_database(),
            audit: AuditTarget::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(PrazoError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one exists. Returns true if written.
    pub fn write_default(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Config::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    pub fn database_path(&self, root: &Path) -> PathBuf {
        paths::database_path(root, &self.database)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let t = &self.thresholds;

        for (key, value) in [
            ("urgent_days", t.urgent_days),
            ("attention_days", t.attention_days),
        ] {
            if value < 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("thresholds.{key} ({value}) must not be negative"),
                });
            }
        }

        if t.urgent_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "thresholds.urgent_days is 0: no case will ever be classified urgent"
                    .to_string(),
            });
        }

        if t.urgent_days >= t.attention_days {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "thresholds.urgent_days ({}) must be lower than thresholds.attention_days ({})",
                    t.urgent_days, t.attention_days
                ),
            });
        }

        if self.database.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "database path is empty".to_string(),
            });
        }

        warnings
    }

    /// Fail on the first error-level finding of [`Config::validate`].
    /// Warnings alone pass.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect();
        if errors.is_empty() {
            return Ok(());
        }
        Err(PrazoError::validation(format!(
            "invalid config: {}",
            errors.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.thresholds.urgent_days, 5);
        assert_eq!(cfg.thresholds.attention_days, 10);
        assert_eq!(cfg.database, PathBuf::from(".prazos/prazos.redb"));
        assert_eq!(cfg.audit, AuditTarget::Store);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, PrazoError::NotInitialized));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.thresholds.attention_days = 15;
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.thresholds.attention_days, 15);
        assert_eq!(loaded.thresholds.urgent_days, 5);
    }

    #[test]
    fn write_default_keeps_existing() {
        let dir = TempDir::new().unwrap();
        assert!(Config::write_default(dir.path()).unwrap());
        let mut cfg = Config::load(dir.path()).unwrap();
        cfg.thresholds.urgent_days = 3;
        cfg.save(dir.path()).unwrap();

        assert!(!Config::write_default(dir.path()).unwrap());
        assert_eq!(Config::load(dir.path()).unwrap().thresholds.urgent_days, 3);
    }

    #[test]
    fn audit_target_parses() {
        let cfg: Config = serde_yaml::from_str("audit: log\n").unwrap();
        assert_eq!(cfg.audit, AuditTarget::Log);
        assert!(serde_yaml::from_str::<Config>("audit: syslog\n").is_err());
    }

    #[test]
    fn negative_thresholds_are_errors() {
        let mut cfg = Config::default();
        cfg.thresholds.urgent_days = -1;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
        assert!(warnings[0].message.contains("urgent_days (-1)"));

        cfg.thresholds = Thresholds {
            urgent_days: -5,
            attention_days: -2,
        };
        let errors = cfg
            .validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 2);
        assert!(cfg.ensure_valid().is_err());
    }

    #[test]
    fn zero_urgent_is_only_a_warning() {
        let mut cfg = Config::default();
        cfg.thresholds.urgent_days = 0;
        assert_eq!(cfg.validate()[0].level, WarnLevel::Warning);
        assert!(cfg.ensure_valid().is_ok());
    }

    #[test]
    fn inverted_thresholds_are_an_error() {
        let mut cfg = Config::default();
        cfg.thresholds.urgent_days = 12;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
        assert!(warnings[0].message.contains("urgent_days"));

        let err = cfg.ensure_valid().unwrap_err();
        assert!(matches!(err, PrazoError::Validation(_)));
    }
}
