//! The settlement simplifier: nets pairwise debts down to a minimal set of
//! transfers via the greedy min-cash-flow heuristic.

use std::collections::{BTreeMap, HashMap};

use crate::{MoneyCents, PairwiseDebts, UserId};

/// One net-balance slot per user appearing anywhere in the pairwise debts.
///
/// Positive = net creditor (others owe them), negative = net debtor. The
/// slot order is first-seen order while scanning the debt triples, payer
/// before debtor within each triple; that order is the deterministic
/// tie-break rule for the greedy matching below. The vector always sums to
/// zero: every amount is added to a payer slot and subtracted from a debtor
/// slot.
#[derive(Clone, Debug)]
pub struct NetBalances {
    users: Vec<UserId>,
    slots: Vec<MoneyCents>,
    index: HashMap<UserId, usize>,
}

impl NetBalances {
    /// Extracts net balances from aggregated pairwise debts.
    ///
    /// The payer advanced money, so they are owed it back (slot goes up);
    /// the debtor consumed it, so they owe it (slot goes down).
    #[must_use]
    pub fn from_debts(debts: &PairwiseDebts) -> Self {
        let mut balances = Self {
            users: Vec::new(),
            slots: Vec::new(),
            index: HashMap::new(),
        };

        for &(payer, debtor, amount) in debts.iter() {
            let payer_slot = balances.slot_of(payer);
            balances.slots[payer_slot] += amount;
            let debtor_slot = balances.slot_of(debtor);
            balances.slots[debtor_slot] -= amount;
        }

        balances
    }

    fn slot_of(&mut self, user: UserId) -> usize {
        match self.index.get(&user) {
            Some(&at) => at,
            None => {
                let at = self.users.len();
                self.index.insert(user, at);
                self.users.push(user);
                self.slots.push(MoneyCents::ZERO);
                at
            }
        }
    }

    /// Number of distinct participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Net position of a single user, zero if they appear nowhere.
    #[must_use]
    pub fn balance_of(&self, user: UserId) -> MoneyCents {
        self.index
            .get(&user)
            .map_or(MoneyCents::ZERO, |&at| self.slots[at])
    }

    /// Sum over all slots; always zero by construction (conservation).
    #[must_use]
    pub fn total(&self) -> MoneyCents {
        self.slots.iter().copied().sum()
    }

    /// Iterates `(user, net amount)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (UserId, MoneyCents)> + '_ {
        self.users.iter().copied().zip(self.slots.iter().copied())
    }

    // First occurrence wins ties, hence the strict comparisons.
    fn argmin(&self) -> usize {
        let mut at = 0;
        for i in 1..self.slots.len() {
            if self.slots[i] < self.slots[at] {
                at = i;
            }
        }
        at
    }

    fn argmax(&self) -> usize {
        let mut at = 0;
        for i in 1..self.slots.len() {
            if self.slots[i] > self.slots[at] {
                at = i;
            }
        }
        at
    }
}

/// Minimal settlement transfers: receiver → giver → amount, read as
/// "receiver receives amount from giver". The receiver is a net creditor
/// being paid back, the giver a net debtor paying their debt down to zero.
///
/// Same flat representation as [`PairwiseDebts`]; the nested shape is the
/// wire format via [`SettlementPlan::to_nested`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    triples: Vec<(UserId, UserId, MoneyCents)>,
    pairs: HashMap<(UserId, UserId), usize>,
}

impl SettlementPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Accumulates in case the same pair recurs across greedy iterations.
    fn add(&mut self, receiver: UserId, giver: UserId, amount: MoneyCents) {
        match self.pairs.get(&(receiver, giver)) {
            Some(&at) => self.triples[at].2 += amount,
            None => {
                self.pairs.insert((receiver, giver), self.triples.len());
                self.triples.push((receiver, giver, amount));
            }
        }
    }

    /// Iterates `(receiver, giver, amount)` triples in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &(UserId, UserId, MoneyCents)> {
        self.triples.iter()
    }

    /// Number of transfers in the plan.
    #[must_use]
    pub fn transfer_count(&self) -> usize {
        self.triples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Exposes the nested receiver → giver → amount shape used on the wire.
    #[must_use]
    pub fn to_nested(&self) -> BTreeMap<UserId, BTreeMap<UserId, MoneyCents>> {
        let mut nested: BTreeMap<UserId, BTreeMap<UserId, MoneyCents>> = BTreeMap::new();
        for &(receiver, giver, amount) in &self.triples {
            nested.entry(receiver).or_default().insert(giver, amount);
        }
        nested
    }
}

/// Produces a minimal settlement plan for the given pairwise debts.
///
/// Classic min-cash-flow greedy heuristic: repeatedly match the largest
/// debtor (most negative slot) with the largest creditor (most positive
/// slot) and transfer the smaller magnitude, zeroing at least one slot per
/// step. Expressed as a bounded loop rather than recursion: with `n`
/// participants at most `n - 1` transfers are needed, so the loop runs at
/// most `n` times (the last pass only observes convergence).
///
/// The heuristic does not guarantee the theoretical minimum transfer count
/// (that problem is NP-hard) but is deterministic under the first-occurrence
/// tie-break and always correct: applying the plan zeroes every balance.
#[must_use]
pub fn simplify(debts: &PairwiseDebts) -> SettlementPlan {
    let mut balances = NetBalances::from_debts(debts);
    let mut plan = SettlementPlan::new();

    for _ in 0..balances.len() {
        let receiver = balances.argmax();
        let giver = balances.argmin();

        if balances.slots[receiver].is_zero() && balances.slots[giver].is_zero() {
            break;
        }

        // Integer cents keep this exact: the smaller-magnitude side lands on
        // zero with no residue.
        let transfer = balances.slots[receiver].min(-balances.slots[giver]);
        plan.add(balances.users[receiver], balances.users[giver], transfer);
        balances.slots[receiver] -= transfer;
        balances.slots[giver] += transfer;
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ShareRecord, ledger::aggregate};

    fn record(payer: i64, debtor: i64, cents: i64) -> ShareRecord {
        ShareRecord::new(UserId::new(payer), UserId::new(debtor), MoneyCents::new(cents))
    }

    #[test]
    fn net_balances_conserve_money() {
        let debts = aggregate(vec![
            record(1, 2, 3000),
            record(1, 3, 3000),
            record(2, 3, 1250),
            record(3, 1, 775),
        ]);
        let balances = NetBalances::from_debts(&debts);

        assert_eq!(balances.total(), MoneyCents::ZERO);
    }

    #[test]
    fn payer_is_credited_debtor_is_debited() {
        let debts = aggregate(vec![record(1, 2, 3000)]);
        let balances = NetBalances::from_debts(&debts);

        assert_eq!(balances.balance_of(UserId::new(1)), MoneyCents::new(3000));
        assert_eq!(balances.balance_of(UserId::new(2)), MoneyCents::new(-3000));
    }

    #[test]
    fn equal_three_way_split_settles_in_two_transfers() {
        // A pays 90 split equally: B owes A 30, C owes A 30.
        let debts = aggregate(vec![record(1, 2, 3000), record(1, 3, 3000)]);
        let plan = simplify(&debts);

        assert_eq!(plan.transfer_count(), 2);
        let nested = plan.to_nested();
        let to_alice = nested.get(&UserId::new(1)).unwrap();
        assert_eq!(to_alice.get(&UserId::new(2)), Some(&MoneyCents::new(3000)));
        assert_eq!(to_alice.get(&UserId::new(3)), Some(&MoneyCents::new(3000)));
    }

    #[test]
    fn mutual_debts_cancel_to_empty_plan() {
        // A pays 100 for B; B pays 100 for A. Net balances all zero.
        let debts = aggregate(vec![record(1, 2, 10000), record(2, 1, 10000)]);
        let plan = simplify(&debts);

        assert!(plan.is_empty());
    }

    #[test]
    fn empty_debts_give_empty_plan() {
        let plan = simplify(&PairwiseDebts::new());
        assert!(plan.is_empty());
    }

    #[test]
    fn plan_applies_back_to_zero() {
        let debts = aggregate(vec![
            record(1, 2, 3721),
            record(1, 3, 1150),
            record(2, 3, 4210),
            record(3, 4, 999),
            record(4, 1, 250),
        ]);
        let mut balances = NetBalances::from_debts(&debts);
        let plan = simplify(&debts);

        for &(receiver, giver, amount) in plan.iter() {
            let r = balances.index[&receiver];
            let g = balances.index[&giver];
            balances.slots[r] -= amount;
            balances.slots[g] += amount;
        }

        assert!(balances.slots.iter().all(|b| b.is_zero()));
    }

    #[test]
    fn transfer_count_bounded_by_participants() {
        let debts = aggregate(vec![
            record(1, 2, 100),
            record(2, 3, 200),
            record(3, 4, 300),
            record(4, 5, 400),
            record(5, 1, 500),
        ]);
        let balances = NetBalances::from_debts(&debts);
        let plan = simplify(&debts);

        assert!(plan.transfer_count() <= balances.len().saturating_sub(1));
    }

    #[test]
    fn chain_collapses_to_direct_transfer() {
        // B owes A 10, C owes B 10: C should simply pay A.
        let debts = aggregate(vec![record(1, 2, 1000), record(2, 3, 1000)]);
        let plan = simplify(&debts);

        assert_eq!(plan.transfer_count(), 1);
        let nested = plan.to_nested();
        let to_alice = nested.get(&UserId::new(1)).unwrap();
        assert_eq!(to_alice.get(&UserId::new(3)), Some(&MoneyCents::new(1000)));
    }
}
