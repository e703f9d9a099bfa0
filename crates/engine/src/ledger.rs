//! The ledger aggregator: reduces flat share records into net pairwise debt.

use std::collections::{BTreeMap, HashMap};

use crate::{MoneyCents, ShareRecord, UserId};

/// Net pairwise debt implied by a set of share records: payer → debtor →
/// cumulative amount owed back to the payer.
///
/// Internally this is a flat list of `(payer, debtor, amount)` triples plus a
/// pair index for lookup; the nested mapping shape only materializes at the
/// serialization boundary via [`PairwiseDebts::to_nested`]. The triple order
/// is first-insertion order, which keeps downstream net-balance extraction
/// deterministic.
///
/// Invariants:
/// - all amounts are positive (sparse: a pair that nets to zero is absent)
/// - no `(u, u)` self pairs
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairwiseDebts {
    triples: Vec<(UserId, UserId, MoneyCents)>,
    pairs: HashMap<(UserId, UserId), usize>,
}

impl PairwiseDebts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the debt `debtor` owes `payer`.
    ///
    /// Zero amounts leave the ledger untouched so the sparse invariant holds.
    pub fn add(&mut self, payer: UserId, debtor: UserId, amount: MoneyCents) {
        if amount.is_zero() {
            return;
        }
        match self.pairs.get(&(payer, debtor)) {
            Some(&at) => self.triples[at].2 += amount,
            None => {
                self.pairs.insert((payer, debtor), self.triples.len());
                self.triples.push((payer, debtor, amount));
            }
        }
    }

    /// Returns the cumulative amount `debtor` owes `payer`, if any.
    #[must_use]
    pub fn get(&self, payer: UserId, debtor: UserId) -> Option<MoneyCents> {
        self.pairs.get(&(payer, debtor)).map(|&at| self.triples[at].2)
    }

    /// Iterates `(payer, debtor, amount)` triples in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(UserId, UserId, MoneyCents)> {
        self.triples.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Number of distinct `(payer, debtor)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Exposes the nested payer → debtor → amount shape used on the wire.
    #[must_use]
    pub fn to_nested(&self) -> BTreeMap<UserId, BTreeMap<UserId, MoneyCents>> {
        let mut nested: BTreeMap<UserId, BTreeMap<UserId, MoneyCents>> = BTreeMap::new();
        for &(payer, debtor, amount) in &self.triples {
            nested.entry(payer).or_default().insert(debtor, amount);
        }
        nested
    }
}

/// Reduces share records into net pairwise debt.
///
/// For each record where the debtor is not the payer, adds the share amount
/// to the pair's cumulative debt. Self-records are silently skipped. Pure,
/// total and independent of input order: reordering the records changes at
/// most the insertion order of the triples, never the mapping.
#[must_use]
pub fn aggregate<I>(records: I) -> PairwiseDebts
where
    I: IntoIterator<Item = ShareRecord>,
{
    let mut debts = PairwiseDebts::new();
    for record in records {
        if record.is_self_share() {
            continue;
        }
        debts.add(record.payer_id, record.debtor_id, record.amount);
    }
    debts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(payer: i64, debtor: i64, cents: i64) -> ShareRecord {
        ShareRecord::new(UserId::new(payer), UserId::new(debtor), MoneyCents::new(cents))
    }

    #[test]
    fn accumulates_per_pair() {
        let debts = aggregate(vec![record(1, 2, 3000), record(1, 2, 1500), record(1, 3, 500)]);

        assert_eq!(debts.get(UserId::new(1), UserId::new(2)), Some(MoneyCents::new(4500)));
        assert_eq!(debts.get(UserId::new(1), UserId::new(3)), Some(MoneyCents::new(500)));
        assert_eq!(debts.len(), 2);
    }

    #[test]
    fn skips_self_shares() {
        let debts = aggregate(vec![record(1, 1, 3000), record(1, 2, 3000)]);

        assert_eq!(debts.get(UserId::new(1), UserId::new(1)), None);
        assert_eq!(debts.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_ledger() {
        let debts = aggregate(Vec::new());
        assert!(debts.is_empty());
        assert!(debts.to_nested().is_empty());
    }

    #[test]
    fn zero_amounts_stay_sparse() {
        let debts = aggregate(vec![record(1, 2, 0)]);
        assert!(debts.is_empty());
    }

    #[test]
    fn mapping_is_order_independent() {
        let forward = aggregate(vec![record(1, 2, 100), record(2, 1, 200), record(1, 3, 300)]);
        let backward = aggregate(vec![record(1, 3, 300), record(2, 1, 200), record(1, 2, 100)]);

        assert_eq!(forward.to_nested(), backward.to_nested());
    }

    #[test]
    fn nested_shape_groups_by_payer() {
        let debts = aggregate(vec![record(1, 2, 3000), record(1, 3, 3000)]);
        let nested = debts.to_nested();

        let by_alice = nested.get(&UserId::new(1)).unwrap();
        assert_eq!(by_alice.len(), 2);
        assert_eq!(by_alice.get(&UserId::new(2)), Some(&MoneyCents::new(3000)));
        assert_eq!(by_alice.get(&UserId::new(3)), Some(&MoneyCents::new(3000)));
    }
}
