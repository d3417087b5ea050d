//! VetMe staking service — the runtime shell around a staking ledger.
//!
//! The service:
//! - Builds a ledger and token ledger from TOML configuration
//! - Stamps every operation with time from an injected clock
//! - Serialises all operations behind one async lock
//! - Emits structured logs and spans for each ledger operation
//! - Replays scripted reward-period scenarios

pub mod config;
pub mod error;
pub mod logging;
pub mod scenario;
pub mod service;
pub mod tracing_spans;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::{init_logging, LogFormat};
pub use scenario::{Action, Scenario, SimulationReport, StepOutcome};
pub use service::{AccountSnapshot, LedgerSnapshot, StakingService};
