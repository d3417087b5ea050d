//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use vetme_token::{TokenInfo, GENESIS_SUPPLY_TOKENS};
use vetme_types::{to_raw, AccountId, StakingParams, DEFAULT_WITHDRAW_COOLDOWN_SECS};

use crate::logging::LogFormat;
use crate::ServiceError;

/// Configuration for a staking service instance.
///
/// Amounts are in whole tokens; they are scaled to raw units by
/// [`staking_params`](Self::staking_params) and
/// [`genesis_supply_raw`](Self::genesis_supply_raw).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Ledger owner: funds rewards and opens reward periods. `0x` hex.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Token-ledger account holding staked and funded tokens. `0x` hex.
    #[serde(default = "default_custody")]
    pub custody: String,

    /// Cool-down between requesting and executing a withdrawal.
    #[serde(default = "default_withdraw_cooldown_secs")]
    pub withdraw_cooldown_secs: u64,

    /// Staking pool size in whole tokens: caps the total staked and is the
    /// denominator rewards are shared over. Unset shares rewards among
    /// whatever is staked.
    #[serde(default)]
    pub total_for_stake: Option<u64>,

    /// Supply minted to the owner at genesis, in whole tokens.
    #[serde(default = "default_genesis_supply")]
    pub genesis_supply: u64,

    #[serde(default = "default_token_name")]
    pub token_name: String,

    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_owner() -> String {
    AccountId::from_index(1).to_string()
}

fn default_custody() -> String {
    AccountId::from_index(0x5741_4b45).to_string()
}

fn default_withdraw_cooldown_secs() -> u64 {
    DEFAULT_WITHDRAW_COOLDOWN_SECS
}

fn default_genesis_supply() -> u64 {
    GENESIS_SUPPLY_TOKENS as u64
}

fn default_token_name() -> String {
    TokenInfo::default().name
}

fn default_token_symbol() -> String {
    TokenInfo::default().symbol
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))
    }

    pub fn owner_account(&self) -> Result<AccountId, ServiceError> {
        AccountId::from_hex(&self.owner)
            .map_err(|e| ServiceError::Config(format!("owner: {e}")))
    }

    pub fn custody_account(&self) -> Result<AccountId, ServiceError> {
        AccountId::from_hex(&self.custody)
            .map_err(|e| ServiceError::Config(format!("custody: {e}")))
    }

    /// Ledger parameters with amounts scaled to raw units.
    pub fn staking_params(&self) -> Result<StakingParams, ServiceError> {
        let total_for_stake = self
            .total_for_stake
            .map(|whole| to_raw(u128::from(whole)))
            .transpose()?;
        Ok(StakingParams {
            withdraw_cooldown_secs: self.withdraw_cooldown_secs,
            total_for_stake,
        })
    }

    pub fn genesis_supply_raw(&self) -> Result<u128, ServiceError> {
        Ok(to_raw(u128::from(self.genesis_supply))?)
    }

    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            name: self.token_name.clone(),
            symbol: self.token_symbol.clone(),
            ..TokenInfo::default()
        }
    }

    pub fn log_format(&self) -> Result<LogFormat, ServiceError> {
        self.log_format.parse()
    }

    /// Check every derived value parses, without building anything.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let owner = self.owner_account()?;
        let custody = self.custody_account()?;
        if owner == custody {
            return Err(ServiceError::Config(
                "owner and custody must be distinct accounts".to_string(),
            ));
        }
        if self.total_for_stake == Some(0) {
            return Err(ServiceError::Config(
                "total_for_stake must be nonzero when set".to_string(),
            ));
        }
        self.staking_params()?;
        self.genesis_supply_raw()?;
        self.log_format()?;
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            custody: default_custody(),
            withdraw_cooldown_secs: default_withdraw_cooldown_secs(),
            total_for_stake: None,
            genesis_supply: default_genesis_supply(),
            token_name: default_token_name(),
            token_symbol: default_token_symbol(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
