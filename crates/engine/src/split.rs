//! Share preparation: turns an expense total into one share per participant.
//!
//! This is upstream input preparation for the balance engine; the aggregator
//! only ever sees the finalized `(payer, debtor, amount)` triples built from
//! these shares.

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents};

/// Number of basis points in 100% (1% = 100 bp).
pub const PERCENT_SCALE: i64 = 10_000;

/// How an expense total is divided among participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitKind {
    /// Total divided evenly; participants declare no share.
    Equal,
    /// Participants declare exact shares in cents; they must sum to the total.
    Exact,
    /// Participants declare shares in basis points; they must sum to 100%.
    Percent,
}

impl SplitKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::Exact => "EXACT",
            Self::Percent => "PERCENT",
        }
    }
}

impl TryFrom<&str> for SplitKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EQUAL" => Ok(Self::Equal),
            "EXACT" => Ok(Self::Exact),
            "PERCENT" => Ok(Self::Percent),
            other => Err(EngineError::InvalidSplit(format!(
                "unknown split kind {other}"
            ))),
        }
    }
}

/// Computes one share per participant, in participant order.
///
/// `declared` carries the per-participant inputs: ignored for
/// [`SplitKind::Equal`], cents for [`SplitKind::Exact`], basis points for
/// [`SplitKind::Percent`]. Shares always sum exactly to `total`: for the
/// rounding kinds the leftover cents land on the first participant.
pub fn split_shares(
    kind: SplitKind,
    total: MoneyCents,
    declared: &[Option<i64>],
) -> Result<Vec<MoneyCents>, EngineError> {
    if declared.is_empty() {
        return Err(EngineError::InvalidSplit(
            "an expense needs at least one participant".to_string(),
        ));
    }
    if !total.is_positive() {
        return Err(EngineError::InvalidAmount(
            "total amount must be positive".to_string(),
        ));
    }

    match kind {
        SplitKind::Equal => {
            let n = declared.len() as i64;
            let base = total.cents() / n;
            let remainder = total.cents() - base * n;

            let mut shares = vec![MoneyCents::new(base); declared.len()];
            shares[0] += MoneyCents::new(remainder);
            Ok(shares)
        }
        SplitKind::Exact => {
            let mut shares = Vec::with_capacity(declared.len());
            for share in declared {
                let cents = share.ok_or_else(|| {
                    EngineError::InvalidSplit(
                        "every participant needs a share for an EXACT split".to_string(),
                    )
                })?;
                if cents < 0 {
                    return Err(EngineError::InvalidAmount(
                        "shares must be non-negative".to_string(),
                    ));
                }
                shares.push(MoneyCents::new(cents));
            }

            let sum: MoneyCents = shares.iter().copied().sum();
            if sum != total {
                return Err(EngineError::InvalidSplit(
                    "total shares must equal the total amount for EXACT split".to_string(),
                ));
            }
            Ok(shares)
        }
        SplitKind::Percent => {
            let mut basis_points = Vec::with_capacity(declared.len());
            for share in declared {
                let bp = share.ok_or_else(|| {
                    EngineError::InvalidSplit(
                        "every participant needs a percentage for a PERCENT split".to_string(),
                    )
                })?;
                if bp < 0 {
                    return Err(EngineError::InvalidAmount(
                        "percentages must be non-negative".to_string(),
                    ));
                }
                basis_points.push(bp);
            }

            if basis_points.iter().sum::<i64>() != PERCENT_SCALE {
                return Err(EngineError::InvalidSplit(
                    "percentage shares must sum to 100 for PERCENT split".to_string(),
                ));
            }

            let mut shares: Vec<MoneyCents> = basis_points
                .iter()
                .map(|&bp| MoneyCents::new(total.cents() * bp / PERCENT_SCALE))
                .collect();
            let assigned: MoneyCents = shares.iter().copied().sum();
            shares[0] += total - assigned;
            Ok(shares)
        }
    }
}
