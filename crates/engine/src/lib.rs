//! Pure balance aggregation and debt-simplification engine.
//!
//! The engine turns a flat list of [`ShareRecord`]s (one participant's share
//! of one expense, annotated with the payer) into:
//!
//! 1. a pairwise "who-owes-whom" ledger ([`raw_balances`]), and
//! 2. a minimal settlement plan via the greedy min-cash-flow heuristic
//!    ([`simplified_balances`]).
//!
//! Everything here is a pure function of its input: no persistence, no
//! shared state, no I/O. The surrounding HTTP/storage layers supply the
//! records and serialize the nested-map output. Amounts are integer cents
//! ([`MoneyCents`]) throughout, so comparisons and the settlement
//! termination check are exact.

pub use error::EngineError;
pub use ledger::{PairwiseDebts, aggregate};
pub use money::MoneyCents;
pub use records::{ShareRecord, UserId};
pub use settlement::{NetBalances, SettlementPlan, simplify};
pub use split::{PERCENT_SCALE, SplitKind, split_shares};

mod error;
mod ledger;
mod money;
mod records;
mod settlement;
mod split;

/// Full, unsimplified balances: every net pairwise debt implied by the
/// records.
#[must_use]
pub fn raw_balances<I>(records: I) -> PairwiseDebts
where
    I: IntoIterator<Item = ShareRecord>,
{
    ledger::aggregate(records)
}

/// Aggregation followed by simplification: the minimal settlement plan that
/// nets every participant's balance to zero.
#[must_use]
pub fn simplified_balances<I>(records: I) -> SettlementPlan
where
    I: IntoIterator<Item = ShareRecord>,
{
    settlement::simplify(&ledger::aggregate(records))
}
