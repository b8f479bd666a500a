//! Configuration for the token ledger
//!
//! All fields are fixed at construction; the only post-construction
//! administration happens through explicit ledger operations (authority
//! hand-off, gate overrides).

use crate::error::{Error, Result};
use crate::types::{amount_string, Address, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Display name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// Decimal precision for display purposes
    pub decimals: u8,

    /// Maximum circulating supply, in base units
    #[serde(with = "amount_string")]
    pub max_supply: Amount,

    /// Initial authority holder
    pub authority: Address,

    /// Optional initial transfer-unlock threshold; absent means
    /// transfers start unlocked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_at: Option<DateTime<Utc>>,
}

impl TokenConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: TokenConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    ///
    /// Required: `TOKEN_NAME`, `TOKEN_SYMBOL`, `TOKEN_DECIMALS`,
    /// `TOKEN_MAX_SUPPLY`, `TOKEN_AUTHORITY`. Optional:
    /// `TOKEN_UNLOCK_AT` (RFC 3339).
    pub fn from_env() -> Result<Self> {
        fn required(key: &str) -> Result<String> {
            std::env::var(key).map_err(|_| Error::Config(format!("{} not set", key)))
        }

        let decimals = required("TOKEN_DECIMALS")?
            .parse()
            .map_err(|e| Error::Config(format!("TOKEN_DECIMALS: {}", e)))?;
        let max_supply = required("TOKEN_MAX_SUPPLY")?
            .parse()
            .map_err(|e| Error::Config(format!("TOKEN_MAX_SUPPLY: {}", e)))?;
        let authority = required("TOKEN_AUTHORITY")?.parse()?;
        let unlock_at = match std::env::var("TOKEN_UNLOCK_AT") {
            Ok(raw) => Some(
                raw.parse::<DateTime<Utc>>()
                    .map_err(|e| Error::Config(format!("TOKEN_UNLOCK_AT: {}", e)))?,
            ),
            Err(_) => None,
        };

        let config = Self {
            name: required("TOKEN_NAME")?,
            symbol: required("TOKEN_SYMBOL")?,
            decimals,
            max_supply,
            authority,
            unlock_at,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check construction invariants
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("token name must not be empty".to_string()));
        }
        if self.symbol.is_empty() {
            return Err(Error::Config("token symbol must not be empty".to_string()));
        }
        if self.max_supply == 0 {
            return Err(Error::Config("max supply must be positive".to_string()));
        }
        if self.authority.is_zero() {
            return Err(Error::Config(
                "initial authority must not be the zero address".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn addr(tag: u8) -> Address {
        let mut bytes = [0u8; 32];
        bytes[31] = tag;
        Address::new(bytes)
    }

    fn test_config() -> TokenConfig {
        TokenConfig {
            name: "Aurum".to_string(),
            symbol: "AUR".to_string(),
            decimals: 18,
            max_supply: 1_000_000,
            authority: addr(1),
            unlock_at: None,
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        test_config().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_authority() {
        let mut config = test_config();
        config.authority = Address::ZERO;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_max_supply() {
        let mut config = test_config();
        config.max_supply = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_symbol() {
        let mut config = test_config();
        config.symbol.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file_round_trip() {
        let config = test_config();
        let rendered = toml::to_string(&config).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(rendered.as_bytes()).unwrap();

        let loaded = TokenConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded.name, config.name);
        assert_eq!(loaded.symbol, config.symbol);
        assert_eq!(loaded.max_supply, config.max_supply);
        assert_eq!(loaded.authority, config.authority);
        assert_eq!(loaded.unlock_at, None);
    }

    #[test]
    fn test_from_file_parses_large_supply_and_threshold() {
        let authority = addr(7);
        let raw = format!(
            "name = \"Aurum\"\n\
             symbol = \"AUR\"\n\
             decimals = 18\n\
             max_supply = \"340282366920938463463374607431768211455\"\n\
             authority = \"{}\"\n\
             unlock_at = \"2026-01-01T00:00:00Z\"\n",
            authority
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();

        let loaded = TokenConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded.max_supply, Amount::MAX);
        assert_eq!(loaded.authority, authority);
        assert!(loaded.unlock_at.is_some());
    }

    #[test]
    fn test_from_file_missing_is_config_error() {
        let err = TokenConfig::from_file("/nonexistent/token.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
