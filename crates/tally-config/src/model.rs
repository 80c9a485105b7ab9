use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tally_domain::TierRateTable;

/// Stores operator-configurable billing preferences and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub currency: String,
    /// Tax rate applied to drafts that do not specify one (0.06 = 6%).
    #[serde(default = "Config::default_tax_rate")]
    pub default_tax_rate: f64,
    /// Payment term used when a receivable is opened at invoice creation.
    #[serde(default = "Config::default_receivable_due_days")]
    pub receivable_due_days: i64,
    #[serde(default)]
    pub tier_rates: TierRateTable,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for the data file. Defaults to
    /// `~/Documents/Tally`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            default_tax_rate: Self::default_tax_rate(),
            receivable_due_days: Self::default_receivable_due_days(),
            tier_rates: TierRateTable::default(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_tax_rate() -> f64 {
        0.0
    }

    pub fn default_receivable_due_days() -> i64 {
        30
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Tally")
    }
}
