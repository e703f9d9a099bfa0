use engine::{
    MoneyCents, NetBalances, ShareRecord, SplitKind, UserId, raw_balances, simplified_balances,
    split_shares,
};

fn record(payer: i64, debtor: i64, cents: i64) -> ShareRecord {
    ShareRecord::new(UserId::new(payer), UserId::new(debtor), MoneyCents::new(cents))
}

/// Builds the records an equal split of `total` among `participants` paid by
/// `payer` produces, self-share included.
fn equal_expense(payer: i64, participants: &[i64], total: i64) -> Vec<ShareRecord> {
    let shares = split_shares(
        SplitKind::Equal,
        MoneyCents::new(total),
        &vec![None; participants.len()],
    )
    .unwrap();

    participants
        .iter()
        .zip(shares)
        .map(|(&debtor, share)| ShareRecord::new(UserId::new(payer), UserId::new(debtor), share))
        .collect()
}

#[test]
fn worked_example_ninety_split_three_ways() {
    // A pays 90.00 split equally among A, B, C.
    let records = equal_expense(1, &[1, 2, 3], 9000);
    let debts = raw_balances(records.clone());

    let nested = debts.to_nested();
    assert_eq!(nested.len(), 1);
    let by_a = nested.get(&UserId::new(1)).unwrap();
    assert_eq!(by_a.get(&UserId::new(2)), Some(&MoneyCents::new(3000)));
    assert_eq!(by_a.get(&UserId::new(3)), Some(&MoneyCents::new(3000)));
    assert!(by_a.get(&UserId::new(1)).is_none());

    let plan = simplified_balances(records);
    assert_eq!(plan.transfer_count(), 2);
    let total_to_a: MoneyCents = plan
        .iter()
        .filter(|(receiver, _, _)| *receiver == UserId::new(1))
        .map(|&(_, _, amount)| amount)
        .sum();
    assert_eq!(total_to_a, MoneyCents::new(6000));
}

#[test]
fn worked_example_mutual_debts_cancel() {
    let records = vec![record(1, 2, 10000), record(2, 1, 10000)];

    let debts = raw_balances(records.clone());
    assert_eq!(
        debts.get(UserId::new(1), UserId::new(2)),
        Some(MoneyCents::new(10000))
    );
    assert_eq!(
        debts.get(UserId::new(2), UserId::new(1)),
        Some(MoneyCents::new(10000))
    );

    let balances = NetBalances::from_debts(&debts);
    assert!(balances.iter().all(|(_, b)| b.is_zero()));
    assert!(simplified_balances(records).is_empty());
}

#[test]
fn conservation_holds_across_many_expenses() {
    let mut records = equal_expense(1, &[1, 2, 3, 4], 10001);
    records.extend(equal_expense(2, &[1, 2], 777));
    records.extend(equal_expense(3, &[2, 3, 4], 5000));

    let balances = NetBalances::from_debts(&raw_balances(records));
    assert_eq!(balances.total(), MoneyCents::ZERO);
}

#[test]
fn plan_size_bounded_by_participants_minus_one() {
    let mut records = Vec::new();
    for payer in 1..=6 {
        records.extend(equal_expense(payer, &[1, 2, 3, 4, 5, 6], 1000 * payer));
    }

    let debts = raw_balances(records.clone());
    let participants = NetBalances::from_debts(&debts).len();
    let plan = simplified_balances(records);

    assert!(plan.transfer_count() <= participants - 1);
}

#[test]
fn reordering_records_does_not_change_the_ledger() {
    let records = vec![
        record(1, 2, 3000),
        record(2, 3, 4500),
        record(1, 3, 250),
        record(3, 1, 999),
    ];
    let mut reversed = records.clone();
    reversed.reverse();

    assert_eq!(
        raw_balances(records).to_nested(),
        raw_balances(reversed).to_nested()
    );
}
