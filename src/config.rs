use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::lifecycle::ToggleMode;
use crate::logging::LogConfig;
use crate::models::{AlcoholConsumption, Diet, LifestyleProfile, SmokingStatus, VitalsSample};
use crate::stress::StressEstimator;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Logging output
    #[serde(default)]
    pub logging: LogConfig,

    /// Stored lifestyle fields
    #[serde(default)]
    pub profile: ProfileSettings,

    /// Plan lifecycle behavior
    #[serde(default)]
    pub plans: PlanSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Lifestyle fields as the user last saved them; `None` means never entered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub diet: Option<Diet>,
    pub smoking: Option<SmokingStatus>,
    pub alcohol: Option<AlcoholConsumption>,

    /// Explicit stress percentage, takes precedence over vitals
    pub stress_percent: Option<f64>,

    /// Latest blood pressure reading
    pub vitals: Option<VitalsSample>,
}

impl ProfileSettings {
    /// Build the scoring input, resolving stress from vitals when needed
    pub fn lifestyle(&self) -> LifestyleProfile {
        LifestyleProfile {
            diet: self.diet.unwrap_or_default(),
            smoking: self.smoking.unwrap_or_default(),
            alcohol: self.alcohol.unwrap_or_default(),
            stress_percent: StressEstimator::resolve(self.stress_percent, self.vitals.as_ref()),
        }
    }

    /// Whether the user has saved any of diet, smoking or alcohol
    pub fn has_lifestyle_data(&self) -> bool {
        self.diet.is_some() || self.smoking.is_some() || self.alcohol.is_some()
    }
}

/// Plan lifecycle settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSettings {
    /// Confirmed waits for the backend before updating local completion
    pub toggle_mode: ToggleMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            logging: LogConfig::default(),
            profile: ProfileSettings::default(),
            plans: PlanSettings::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fitwell")
            .join("config.toml")
    }

    /// Load configuration from `path`, falling back to defaults when it is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            tracing::debug!(
                path = %path.as_ref().display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_file(path)
    }

    /// Current lifestyle profile for scoring
    pub fn lifestyle_profile(&self) -> LifestyleProfile {
        self.profile.lifestyle()
    }

    /// Overwrite the stored profile fields
    pub fn set_profile(&mut self, profile: ProfileSettings) {
        self.profile = profile;
        self.metadata.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.plans, deserialized.plans);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.set_profile(ProfileSettings {
            diet: Some(Diet::Pescatarian),
            smoking: Some(SmokingStatus::Occasional),
            alcohol: Some(AlcoholConsumption::Moderate),
            stress_percent: None,
            vitals: Some(VitalsSample::blood_pressure(140.0, 95.0)),
        });
        original.plans.toggle_mode = ToggleMode::Optimistic;

        original.save_to_file(&config_path).unwrap();
        let loaded = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded.profile, original.profile);
        assert_eq!(loaded.plans.toggle_mode, ToggleMode::Optimistic);
        assert_eq!(loaded.lifestyle_profile().stress_percent, 17.5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [metadata]
            version = "1.0"
            created_at = "2025-01-01T00:00:00Z"
            updated_at = "2025-01-01T00:00:00Z"

            [profile]
            diet = "non-vegetarian"
            smoking = "heavy"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.profile.diet, Some(Diet::NonVegetarian));
        assert_eq!(config.profile.alcohol, None);
        assert_eq!(config.lifestyle_profile().alcohol, AlcoholConsumption::None);
        assert_eq!(config.plans.toggle_mode, ToggleMode::Confirmed);
        assert!(config.profile.has_lifestyle_data());
        assert_eq!(config.lifestyle_profile().stress_percent, 0.0);
    }

    #[test]
    fn test_saved_default_values_count_as_lifestyle_data() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.set_profile(ProfileSettings {
            diet: Some(Diet::Vegetarian),
            smoking: Some(SmokingStatus::NonSmoker),
            alcohol: Some(AlcoholConsumption::None),
            ..ProfileSettings::default()
        });
        config.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert!(loaded.profile.has_lifestyle_data());
        assert_eq!(loaded.lifestyle_profile(), LifestyleProfile::default());

        let vitals_only = ProfileSettings {
            vitals: Some(VitalsSample::blood_pressure(130.0, 85.0)),
            ..ProfileSettings::default()
        };
        assert!(!vitals_only.has_lifestyle_data());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let temp_dir = tempdir().unwrap();
        let config = AppConfig::load_or_default(temp_dir.path().join("absent.toml")).unwrap();
        assert!(!config.profile.has_lifestyle_data());
    }
}
