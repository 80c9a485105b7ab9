use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{Config, ConfigError};

const TMP_SUFFIX: &str = "tmp";

/// Handles disk persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join("config.json")))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_domain::{MemberTier, TierRate};
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().expect("load defaults");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.receivable_due_days, 30);
        assert_eq!(config.default_tax_rate, 0.0);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();

        let mut config = Config::default();
        config.currency = "EUR".into();
        config.default_tax_rate = 0.06;
        config.receivable_due_days = 14;
        config.tier_rates.set(
            MemberTier::Gold,
            TierRate {
                discount_rate: 0.1,
                points_rate: 3.0,
            },
        );
        manager.save(&config).expect("save config");

        let loaded = manager.load().expect("reload config");
        assert_eq!(loaded.currency, "EUR");
        assert_eq!(loaded.default_tax_rate, 0.06);
        assert_eq!(loaded.receivable_due_days, 14);
        assert_eq!(
            loaded.tier_rates.rate_for(MemberTier::Gold).points_rate,
            3.0
        );
    }

    #[test]
    fn explicit_data_root_wins_over_the_default() {
        let config = Config {
            data_root: Some(PathBuf::from("/srv/tally-data")),
            ..Config::default()
        };
        assert_eq!(config.resolve_data_root(), PathBuf::from("/srv/tally-data"));

        let defaulted = Config::default();
        assert!(defaulted.resolve_data_root().ends_with("Tally"));
    }
}
