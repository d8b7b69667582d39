use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use coinforge_utils::error::{CoinforgeError, ConfigError, ValidationError};

use crate::ConsensusMechanism;

/// The validated input record for one generation run.
///
/// Defaults mirror a conventional small proof-of-work chain so a minimal
/// plan only needs identity fields:
///
/// ```toml
/// name = "NovaCoin"
/// ticker = "NVC"
/// ```
///
/// Immutable once a generation run begins; the orchestrator receives it
/// by shared reference and never writes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectParameters {
    // Identity
    pub name: String,
    pub ticker: String,
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,
    #[serde(default = "default_unit_name")]
    pub unit_name: String,

    // Economics
    #[serde(default = "default_block_reward")]
    pub block_reward: u64,
    #[serde(default = "default_halving_interval")]
    pub halving_interval: u64,
    #[serde(default = "default_total_supply")]
    pub total_supply: u64,
    #[serde(default = "default_coinbase_maturity")]
    pub coinbase_maturity: u32,
    #[serde(default = "default_confirmation_count")]
    pub confirmation_count: u32,

    // Timing
    #[serde(default = "default_target_spacing")]
    pub target_spacing_minutes: u64,
    #[serde(default = "default_target_timespan")]
    pub target_timespan_minutes: u64,

    // Consensus
    #[serde(default)]
    pub consensus: ConsensusMechanism,

    // Narrative
    #[serde(default)]
    pub mission_statement: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub brand_voice: String,
    #[serde(default)]
    pub token_utility: String,
    #[serde(default)]
    pub distribution_plan: String,
    #[serde(default)]
    pub logo_description: String,
    #[serde(default)]
    pub genesis_message: String,
}

fn default_address_prefix() -> String {
    "N".to_string()
}
fn default_unit_name() -> String {
    "unit".to_string()
}
const fn default_block_reward() -> u64 {
    50
}
const fn default_halving_interval() -> u64 {
    210_000
}
const fn default_total_supply() -> u64 {
    21_000_000
}
const fn default_coinbase_maturity() -> u32 {
    100
}
const fn default_confirmation_count() -> u32 {
    6
}
const fn default_target_spacing() -> u64 {
    10
}
const fn default_target_timespan() -> u64 {
    1440
}

impl ProjectParameters {
    /// Parse a launch plan from TOML text. Does not validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFile` on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidFile(e.to_string()))
    }

    /// Load and validate a launch plan from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `CoinforgeError::Config` for missing or malformed files and
    /// `CoinforgeError::Validation` for shape violations; the two failure
    /// classes stay distinct for exit code mapping.
    pub fn load(path: &Utf8Path) -> Result<Self, CoinforgeError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.to_string(),
        })?;
        let params = Self::from_toml_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Shape validation for the plan.
    ///
    /// This is the only place domain rules are checked; the orchestrator
    /// assumes a validated record and never re-checks.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "name".to_string(),
            });
        }
        validate_ticker(&self.ticker)?;
        validate_address_prefix(&self.address_prefix)?;

        for (field, value) in [
            ("block_reward", self.block_reward),
            ("halving_interval", self.halving_interval),
            ("total_supply", self.total_supply),
            ("target_spacing_minutes", self.target_spacing_minutes),
            ("target_timespan_minutes", self.target_timespan_minutes),
        ] {
            if value == 0 {
                return Err(ValidationError::NonPositive {
                    field: field.to_string(),
                    value: 0,
                });
            }
        }
        for (field, value) in [
            ("coinbase_maturity", self.coinbase_maturity),
            ("confirmation_count", self.confirmation_count),
        ] {
            if value == 0 {
                return Err(ValidationError::NonPositive {
                    field: field.to_string(),
                    value: 0,
                });
            }
        }

        if self.target_spacing_minutes >= self.target_timespan_minutes {
            return Err(ValidationError::SpacingExceedsTimespan {
                spacing_minutes: self.target_spacing_minutes,
                timespan_minutes: self.target_timespan_minutes,
            });
        }

        if self.block_reward > self.total_supply {
            return Err(ValidationError::RewardExceedsSupply {
                block_reward: self.block_reward,
                total_supply: self.total_supply,
            });
        }

        Ok(())
    }

    /// A minimal valid plan for tests.
    #[doc(hidden)]
    #[must_use]
    pub fn minimal_for_testing(name: &str, ticker: &str) -> Self {
        Self::from_toml_str(&format!("name = \"{name}\"\nticker = \"{ticker}\""))
            .expect("minimal plan parses")
    }
}

fn validate_ticker(ticker: &str) -> Result<(), ValidationError> {
    if !(2..=6).contains(&ticker.len()) {
        return Err(ValidationError::InvalidTicker {
            ticker: ticker.to_string(),
            reason: "must be 2-6 characters".to_string(),
        });
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidTicker {
            ticker: ticker.to_string(),
            reason: "only uppercase ASCII letters and digits are allowed".to_string(),
        });
    }
    Ok(())
}

fn validate_address_prefix(prefix: &str) -> Result<(), ValidationError> {
    let mut chars = prefix.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(()),
        _ => Err(ValidationError::InvalidAddressPrefix {
            prefix: prefix.to_string(),
            reason: "must be a single ASCII letter".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOVACOIN_PLAN: &str = r#"
name = "NovaCoin"
ticker = "NVC"
block_reward = 50
total_supply = 21000000
consensus = "SHA-256 - Proof of Work"
target_spacing_minutes = 10
"#;

    #[test]
    fn parses_minimal_plan_with_defaults() {
        let p = ProjectParameters::from_toml_str(NOVACOIN_PLAN).unwrap();
        assert_eq!(p.name, "NovaCoin");
        assert_eq!(p.ticker, "NVC");
        assert_eq!(p.block_reward, 50);
        assert_eq!(p.total_supply, 21_000_000);
        assert_eq!(p.halving_interval, 210_000);
        assert_eq!(p.coinbase_maturity, 100);
        assert_eq!(p.confirmation_count, 6);
        assert_eq!(p.target_timespan_minutes, 1440);
        assert_eq!(p.consensus, ConsensusMechanism::Sha256ProofOfWork);
        p.validate().unwrap();
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ProjectParameters::from_toml_str("name = \"X\"\nticker = \"XX\"\nbogus = 1")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile(_)));
    }

    #[test]
    fn rejects_empty_name() {
        let mut p = ProjectParameters::minimal_for_testing("x", "NVC");
        p.name = "  ".to_string();
        assert!(matches!(
            p.validate(),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn rejects_bad_tickers() {
        for ticker in ["n", "nvc", "TOOLONGX", "NV-C", ""] {
            let mut p = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
            p.ticker = ticker.to_string();
            assert!(
                matches!(p.validate(), Err(ValidationError::InvalidTicker { .. })),
                "ticker {ticker:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_spacing_not_below_timespan() {
        let mut p = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
        p.target_spacing_minutes = 1440;
        assert!(matches!(
            p.validate(),
            Err(ValidationError::SpacingExceedsTimespan { .. })
        ));
    }

    #[test]
    fn rejects_zero_economics() {
        let mut p = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
        p.total_supply = 0;
        assert!(matches!(
            p.validate(),
            Err(ValidationError::NonPositive { .. })
        ));
    }

    #[test]
    fn rejects_reward_above_supply() {
        let mut p = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
        p.block_reward = 22_000_000;
        assert!(matches!(
            p.validate(),
            Err(ValidationError::RewardExceedsSupply { .. })
        ));
    }

    proptest! {
        #[test]
        fn well_formed_tickers_always_validate(
            ticker in "[A-Z0-9]{2,6}"
        ) {
            let mut p = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
            p.ticker = ticker;
            prop_assert!(p.validate().is_ok());
        }

        #[test]
        fn malformed_tickers_never_validate(
            ticker in "[a-z ._-]{1,8}"
        ) {
            let mut p = ProjectParameters::minimal_for_testing("NovaCoin", "NVC");
            p.ticker = ticker;
            prop_assert!(p.validate().is_err());
        }
    }
}
