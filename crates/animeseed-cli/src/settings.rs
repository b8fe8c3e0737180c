use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use animeseed_extract::SourceLayout;

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "animeseed.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Values from `animeseed.toml`; command-line flags take precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub sample_size: Option<usize>,
    pub seed: Option<u64>,
    pub app_users: Option<usize>,
    pub app_user_seed_offset: Option<u64>,
    pub out_dir: Option<PathBuf>,
    pub run_dir: Option<PathBuf>,
    pub progress: Option<bool>,
    pub layout: SourceLayout,
}

impl Settings {
    /// Load `explicit`, which must exist, or the optional default file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) if !path.exists() => Err(SettingsError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_SETTINGS_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file_with_layout_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            sample_size = 25
            seed = 42

            [layout]
            datasets_dir = "/data/datasets"

            [layout.lookup_overrides]
            country = "profiles/country_distinct.csv"
            "#,
        )
        .expect("parse settings");

        assert_eq!(settings.sample_size, Some(25));
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.app_users, None);
        assert_eq!(settings.layout.datasets_dir, PathBuf::from("/data/datasets"));
        assert_eq!(settings.layout.details, PathBuf::from("details.csv"));
        assert_eq!(
            settings.layout.lookup_path("country", "profiles/location_distinct.csv"),
            PathBuf::from("data-import/output/profiles/country_distinct.csv")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Settings>("sampel_size = 3").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("animeseed_{}.toml", uuid::Uuid::new_v4()));
        let err = Settings::load(Some(&path)).expect_err("missing config");
        assert!(matches!(err, SettingsError::NotFound(_)));
    }
}
