//! Run configuration: portal credentials, the per-invoice cap and optional
//! overrides for the portal map.
//!
//! Loaded once at startup and read-only for the rest of the process. A JSON
//! config file is the primary source; when no file is given the credentials
//! fall back to the `AFIP_CUIT` / `AFIP_PASSWORD` environment variables.

use crate::{
    error::{InvoiceError, Result},
    invoice::MAX_INVOICE_AMOUNT,
    portal::{FormChoices, PortalMap},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{env, fs, path::Path};

/// Portal login credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// CUIT (taxpayer id) used as the portal username
    pub cuit: String,
    pub password: String,
}

/// Process-wide configuration, initialized once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub credentials: Credentials,

    /// Per-invoice amount ceiling
    #[serde(default = "default_cap")]
    pub max_invoice_amount: Decimal,

    /// Portal selector overrides; defaults track the current portal markup
    #[serde(default)]
    pub portal: PortalMap,

    /// Form choice overrides (point of sale, concept, tax condition)
    #[serde(default)]
    pub choices: FormChoices,
}

fn default_cap() -> Decimal {
    Decimal::from(MAX_INVOICE_AMOUNT)
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            InvoiceError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&raw).map_err(|e| {
            InvoiceError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()
    }

    /// Build a configuration from environment variables, using defaults for
    /// everything but the credentials.
    pub fn from_env() -> Result<Self> {
        let cuit = env::var("AFIP_CUIT").map_err(|_| {
            InvoiceError::Config("AFIP_CUIT is not set and no config file was given".to_string())
        })?;
        let password = env::var("AFIP_PASSWORD").map_err(|_| {
            InvoiceError::Config("AFIP_PASSWORD is not set and no config file was given".to_string())
        })?;

        Config {
            credentials: Credentials { cuit, password },
            max_invoice_amount: default_cap(),
            portal: PortalMap::default(),
            choices: FormChoices::default(),
        }
        .validate()
    }

    /// Load from the given file, or fall back to the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.credentials.cuit.trim().is_empty() {
            return Err(InvoiceError::Config("credentials.cuit is empty".to_string()));
        }
        if self.max_invoice_amount <= Decimal::ZERO {
            return Err(InvoiceError::Config(format!(
                "max_invoice_amount must be positive, got {}",
                self.max_invoice_amount
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"credentials": {"cuit": "20123456789", "password": "secret"}}"#,
        )
        .unwrap();

        assert_eq!(config.max_invoice_amount, dec!(170000));
        assert_eq!(config.portal.point_of_sale_select, "#puntodeventa");
        assert_eq!(config.choices.concept, "2");
    }

    #[test]
    fn test_cap_override() {
        let config: Config = serde_json::from_str(
            r#"{
                "credentials": {"cuit": "20123456789", "password": "secret"},
                "max_invoice_amount": 250000
            }"#,
        )
        .unwrap();

        assert_eq!(config.max_invoice_amount, dec!(250000));
    }

    #[test]
    fn test_validate_rejects_non_positive_cap() {
        let config: Config = serde_json::from_str(
            r#"{
                "credentials": {"cuit": "20123456789", "password": "secret"},
                "max_invoice_amount": 0
            }"#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = Config::from_file(Path::new("/nonexistent/afip-invoicer.json"));
        assert!(matches!(result, Err(InvoiceError::Config(_))));
    }
}
