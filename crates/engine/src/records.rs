//! Input records for the balance engine.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::MoneyCents;

/// Opaque user identifier.
///
/// The engine treats identifiers as comparable labels only: it never checks
/// that a user exists (callers do that before invoking the engine). On the
/// wire they appear as stringified integers, which is what [`fmt::Display`]
/// and [`FromStr`] produce and accept.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct UserId(i64);

impl UserId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(UserId)
    }
}

/// One participant's share of one expense, annotated with who paid for the
/// whole expense.
///
/// Immutable input to the engine, one per participant per expense. Records
/// where `debtor_id == payer_id` are legal input: the aggregator drops them,
/// since a user does not owe themself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub payer_id: UserId,
    pub debtor_id: UserId,
    pub amount: MoneyCents,
}

impl ShareRecord {
    #[must_use]
    pub const fn new(payer_id: UserId, debtor_id: UserId, amount: MoneyCents) -> Self {
        Self {
            payer_id,
            debtor_id,
            amount,
        }
    }

    /// Returns `true` when the debtor is the payer themself.
    #[must_use]
    pub fn is_self_share(&self) -> bool {
        self.payer_id == self.debtor_id
    }
}
