use log::warn;
use serde::{Deserialize, Serialize};

use crate::pricing::PriceUnit;

/// Environment variable selecting the price unit (`per_thousand`/`per_unit`).
pub const PRICE_UNIT_ENV: &str = "SOCIALBOOST_PRICE_UNIT";

/// Environment variable toggling seeding on open (`true`/`false`).
pub const AUTO_SEED_ENV: &str = "SOCIALBOOST_AUTO_SEED";

/// Behaviour switches for a catalog repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSettings {
    /// Unit every service price refers to.
    pub price_unit: PriceUnit,
    /// Seed the default catalog when the repository is opened.
    pub auto_seed: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            price_unit: PriceUnit::PerThousand,
            auto_seed: true,
        }
    }
}

impl CatalogSettings {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    ///
    /// Unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup(PRICE_UNIT_ENV) {
            match raw.parse::<PriceUnit>() {
                Ok(unit) => settings.price_unit = unit,
                Err(e) => warn!("Ignoring {}: {}", PRICE_UNIT_ENV, e),
            }
        }

        if let Some(raw) = lookup(AUTO_SEED_ENV) {
            match raw.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => settings.auto_seed = true,
                "false" | "0" | "no" => settings.auto_seed = false,
                other => warn!("Ignoring {}: unknown value '{}'", AUTO_SEED_ENV, other),
            }
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = CatalogSettings::from_lookup(lookup(&[]));
        assert_eq!(settings, CatalogSettings::default());
        assert_eq!(settings.price_unit, PriceUnit::PerThousand);
        assert!(settings.auto_seed);
    }

    #[test]
    fn test_overrides() {
        let settings = CatalogSettings::from_lookup(lookup(&[
            (PRICE_UNIT_ENV, "per_unit"),
            (AUTO_SEED_ENV, "false"),
        ]));
        assert_eq!(settings.price_unit, PriceUnit::PerUnit);
        assert!(!settings.auto_seed);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let settings = CatalogSettings::from_lookup(lookup(&[
            (PRICE_UNIT_ENV, "per_gram"),
            (AUTO_SEED_ENV, "maybe"),
        ]));
        assert_eq!(settings, CatalogSettings::default());
    }
}
