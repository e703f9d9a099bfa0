//! Wire types shared by the server and its clients.
//!
//! Balances travel as nested maps keyed by **stringified user ids** with
//! amounts in integer cents; this is the wire contract downstream consumers
//! rely on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Nested payer → debtor → cents (raw balances) or receiver → giver → cents
/// (settlement plan). Keys are stringified user ids.
pub type NestedBalances = BTreeMap<String, BTreeMap<String, i64>>;

pub mod user {
    use super::*;

    /// Request body for creating a user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        /// 10-digit mobile number.
        pub mobile_number: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub user_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub user_id: i64,
        pub name: String,
        pub email: String,
        pub mobile_number: String,
    }
}

pub mod expense {
    use super::*;

    /// How the expense total is divided among participants.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum SplitKind {
        Equal,
        Exact,
        Percent,
    }

    /// One participant of a new expense.
    ///
    /// `share` is ignored for EQUAL splits, cents for EXACT, basis points
    /// (1% = 100) for PERCENT.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantNew {
        pub user_id: i64,
        pub share: Option<i64>,
    }

    /// Request body for creating an expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub lender_id: i64,
        pub name: String,
        pub total_cents: i64,
        pub split_kind: SplitKind,
        pub participants: Vec<ParticipantNew>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub expense_id: i64,
    }
}

pub mod balances {
    use super::*;
    use chrono::{DateTime, Utc};

    /// One row of the per-user detail listing (`GET /balances/:user_id`).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserExpenseView {
        pub name: String,
        pub created_at: DateTime<Utc>,
        pub share_cents: i64,
        pub lender_id: i64,
        pub lender_name: String,
        pub lender_email: String,
        pub total_cents: i64,
    }

    /// Query string for `GET /balances`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BalancesQuery {
        #[serde(default)]
        pub simplify: bool,
    }
}
