use std::env;
use std::path::PathBuf;

pub const CATALOG_VAR: &str = "EXPENSES_CATALOG";
pub const LEDGER_VAR: &str = "EXPENSES_LEDGER";
pub const CURRENCY_VAR: &str = "EXPENSES_CURRENCY";

const DEFAULT_CATALOG: &str = "grocerie.xlsx";
const DEFAULT_LEDGER: &str = "purchases.csv";
const DEFAULT_CURRENCY: &str = "MAD";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub ledger_path: PathBuf,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_path: PathBuf::from(DEFAULT_CATALOG),
            ledger_path: PathBuf::from(DEFAULT_LEDGER),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Settings {
        Settings::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or blank variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();

        Settings {
            catalog_path: value(CATALOG_VAR).map(PathBuf::from).unwrap_or(defaults.catalog_path),
            ledger_path: value(LEDGER_VAR).map(PathBuf::from).unwrap_or(defaults.ledger_path),
            currency: value(CURRENCY_VAR).unwrap_or(defaults.currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Settings::from_lookup(|_| None), Settings::default());
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let vars = HashMap::from([
            (CATALOG_VAR, "/data/catalog.ods".to_string()),
            (LEDGER_VAR, "   ".to_string()),
            (CURRENCY_VAR, " EUR ".to_string()),
        ]);
        let settings = Settings::from_lookup(|key| vars.get(key).cloned());

        assert_eq!(settings.catalog_path, PathBuf::from("/data/catalog.ods"));
        assert_eq!(settings.ledger_path, PathBuf::from(DEFAULT_LEDGER));
        assert_eq!(settings.currency, "EUR");
    }
}
