//! [`tracing::Span`] constructors for staking service operations.
//!
//! Consistent span names and fields make ledger activity easy to filter
//! and correlate in log output.

use tracing::{field, info_span, Span};
use vetme_types::{AccountId, Timestamp};

/// Span covering one account-initiated ledger operation.
///
/// `now` is filled in by [`record_now`] once the ledger lock is held.
pub fn ledger_op_span(op: &'static str, account: &AccountId) -> Span {
    info_span!("ledger_op", op, account = %account, now = field::Empty)
}

/// Span covering an owner-only reward schedule change.
pub fn schedule_span(op: &'static str) -> Span {
    info_span!("schedule", op, now = field::Empty)
}

/// Stamp the current span with the time an operation runs at.
pub fn record_now(now: Timestamp) {
    Span::current().record("now", now.as_secs());
}

/// Span covering a full scenario simulation.
pub fn simulation_span(name: &str, steps: usize) -> Span {
    info_span!("simulation", name = %name, steps)
}
