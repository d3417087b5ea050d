//! Scripted reward-period simulations.
//!
//! A [`Scenario`] funds a set of named accounts, opens one reward period and
//! replays timed account actions against a fresh ledger driven by a
//! [`NullClock`]. Rejected actions are recorded in the report rather than
//! aborting the run, so a scenario can exercise error paths too.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use vetme_nullables::NullClock;
use vetme_types::{format_amount, to_raw, AccountId};

use crate::config::ServiceConfig;
use crate::service::{LedgerSnapshot, StakingService};
use crate::tracing_spans::simulation_span;
use crate::ServiceError;

/// Label under which the configured owner appears in reports.
pub const OWNER_LABEL: &str = "owner";

/// First index used when deriving account ids for scenario labels.
const LABEL_INDEX_BASE: u64 = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,

    /// Length of the reward period opened at t = 0.
    pub reward_duration_secs: u64,

    /// Rewards funded at t = 0, in whole tokens. Zero leaves the period unfunded.
    #[serde(default)]
    pub reward_amount: u64,

    /// Pool size in whole tokens, overriding the service configuration.
    #[serde(default)]
    pub total_for_stake: Option<u64>,

    /// Accounts funded from the owner before the period opens.
    #[serde(default)]
    pub accounts: Vec<Funding>,

    /// Timed actions, in non-decreasing `at` order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Funding {
    pub label: String,
    /// Whole tokens transferred from the owner.
    pub tokens: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    /// Seconds since the period opened.
    pub at: u64,
    pub account: String,
    pub action: Action,
    /// Whole tokens; required by `stake`.
    #[serde(default)]
    pub amount: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stake,
    RequestWithdraw,
    Withdraw,
    Claim,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stake => "stake",
            Self::RequestWithdraw => "request_withdraw",
            Self::Withdraw => "withdraw",
            Self::Claim => "claim",
        }
    }
}

/// Result of one replayed step.
#[derive(Clone, Debug, Serialize)]
pub struct StepOutcome {
    pub at: u64,
    pub account: String,
    pub action: Action,
    pub ok: bool,
    /// Tokens moved by the step, in whole tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Reward part of a claim's `amount`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub name: String,
    pub outcomes: Vec<StepOutcome>,
    pub finish: LedgerSnapshot,
}

impl SimulationReport {
    pub fn to_json(&self) -> Result<String, ServiceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }
}

fn default_name() -> String {
    "unnamed".to_string()
}

impl Scenario {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ServiceError::Scenario(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ServiceError> {
        toml::from_str(s).map_err(|e| ServiceError::Scenario(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self).map_err(|e| ServiceError::Scenario(e.to_string()))
    }

    /// One account stakes 500 of its 5000 tokens into a 5000-token pool
    /// funded with 2000, and claims once the period is over.
    ///
    /// Its share is 500/5000 of the funding, 200 tokens. The claim also
    /// releases the 500 staked, so the account ends with
    /// 5000 − 500 + 500 + 200 = 5200.
    pub fn single_staker() -> Self {
        Self {
            name: "single-staker".to_string(),
            reward_duration_secs: 300,
            reward_amount: 2_000,
            total_for_stake: Some(5_000),
            accounts: vec![Funding {
                label: "alice".to_string(),
                tokens: 5_000,
            }],
            steps: vec![
                Step {
                    at: 0,
                    account: "alice".to_string(),
                    action: Action::Stake,
                    amount: Some(500),
                },
                Step {
                    at: 172_800,
                    account: "alice".to_string(),
                    action: Action::Claim,
                    amount: None,
                },
            ],
        }
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(pair) = self.steps.windows(2).find(|w| w[1].at < w[0].at) {
            return Err(ServiceError::Scenario(format!(
                "steps out of order: t={} follows t={}",
                pair[1].at, pair[0].at
            )));
        }
        let mut seen = HashSet::new();
        for funding in &self.accounts {
            if funding.label == OWNER_LABEL || !seen.insert(funding.label.as_str()) {
                return Err(ServiceError::Scenario(format!(
                    "duplicate account label {:?}",
                    funding.label
                )));
            }
        }
        Ok(())
    }

    /// Replay the scenario against a fresh ledger built from `config`.
    pub async fn run(&self, config: &ServiceConfig) -> Result<SimulationReport, ServiceError> {
        self.validate()?;
        let span = simulation_span(&self.name, self.steps.len());
        self.replay(config).instrument(span).await
    }

    async fn replay(&self, config: &ServiceConfig) -> Result<SimulationReport, ServiceError> {
        let config = ServiceConfig {
            total_for_stake: self.total_for_stake.or(config.total_for_stake),
            ..config.clone()
        };
        let clock = Arc::new(NullClock::new(0));
        let service = StakingService::from_config(&config, clock.clone())?;
        let owner = config.owner_account()?;

        let mut accounts: Vec<(String, AccountId)> = vec![(OWNER_LABEL.to_string(), owner)];
        for (i, funding) in self.accounts.iter().enumerate() {
            let account = AccountId::from_index(LABEL_INDEX_BASE + i as u64);
            service
                .transfer(&owner, &account, to_raw(u128::from(funding.tokens))?)
                .await?;
            accounts.push((funding.label.clone(), account));
        }
        let lookup: HashMap<&str, AccountId> =
            accounts.iter().map(|(l, a)| (l.as_str(), *a)).collect();

        service
            .set_rewards_duration(&owner, self.reward_duration_secs)
            .await?;
        if self.reward_amount > 0 {
            service
                .notify_reward_amount(&owner, to_raw(u128::from(self.reward_amount))?)
                .await?;
        }

        let mut outcomes = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let account = lookup.get(step.account.as_str()).copied().ok_or_else(|| {
                ServiceError::Scenario(format!("unknown account {:?}", step.account))
            })?;
            clock.set(step.at);

            let result = match step.action {
                Action::Stake => {
                    let whole = step.amount.ok_or_else(|| {
                        ServiceError::Scenario(format!("stake at t={} has no amount", step.at))
                    })?;
                    let raw = to_raw(u128::from(whole))?;
                    service.stake(&account, raw).await.map(|_| (Some(raw), None))
                }
                Action::RequestWithdraw => {
                    service.request_withdraw(&account).await.map(|_| (None, None))
                }
                Action::Withdraw => service.withdraw(&account).await.map(|raw| (Some(raw), None)),
                Action::Claim => service
                    .claim_reward(&account)
                    .await
                    .map(|payout| (Some(payout.total()), Some(payout.reward))),
            };
            debug!(at = step.at, account = %step.account, action = step.action.as_str(), ok = result.is_ok(), "step");

            outcomes.push(match result {
                Ok((moved, reward)) => StepOutcome {
                    at: step.at,
                    account: step.account.clone(),
                    action: step.action,
                    ok: true,
                    amount: moved.map(format_amount),
                    reward: reward.map(format_amount),
                    error: None,
                },
                Err(e) => StepOutcome {
                    at: step.at,
                    account: step.account.clone(),
                    action: step.action,
                    ok: false,
                    amount: None,
                    reward: None,
                    error: Some(e.to_string()),
                },
            });
        }

        let finish = service.snapshot(&accounts).await?;
        Ok(SimulationReport {
            name: self.name.clone(),
            outcomes,
            finish,
        })
    }
}
