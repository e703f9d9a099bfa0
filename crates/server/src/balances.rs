//! Balance API endpoints.
//!
//! These handlers only load records and translate shapes; all the numeric
//! work happens in the `engine` crate. Each request reads its records in a
//! single query so the engine sees a consistent snapshot.

use std::collections::{BTreeMap, HashMap};

use api_types::{
    NestedBalances,
    balances::{BalancesQuery, UserExpenseView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use engine::{MoneyCents, ShareRecord, UserId};
use sea_orm::{DbErr, QueryOrder, entity::prelude::*};

use crate::{ServerError, expense, participant, server::ServerState, user};

fn share_records(
    rows: Vec<(participant::Model, Option<expense::Model>)>,
) -> Vec<ShareRecord> {
    rows.into_iter()
        .filter_map(|(row, exp)| {
            let exp = exp?;
            Some(ShareRecord::new(
                UserId::new(exp.user_id),
                UserId::new(row.user_id),
                MoneyCents::new(row.share_cents),
            ))
        })
        .collect()
}

/// Relabels the engine's nested map into the wire shape: stringified user
/// ids, amounts in cents.
fn stringify(nested: BTreeMap<UserId, BTreeMap<UserId, MoneyCents>>) -> NestedBalances {
    nested
        .into_iter()
        .map(|(outer, inner)| {
            (
                outer.to_string(),
                inner
                    .into_iter()
                    .map(|(user, amount)| (user.to_string(), amount.cents()))
                    .collect(),
            )
        })
        .collect()
}

/// Handle requests for everyone's balances, raw or simplified.
pub async fn get_all(
    State(state): State<ServerState>,
    Query(query): Query<BalancesQuery>,
) -> Result<Json<NestedBalances>, ServerError> {
    let rows = participant::Entity::find()
        .find_also_related(expense::Entity)
        .all(&state.db)
        .await?;
    let records = share_records(rows);

    let nested = if query.simplify {
        engine::simplified_balances(records).to_nested()
    } else {
        engine::raw_balances(records).to_nested()
    };

    Ok(Json(stringify(nested)))
}

/// Per-expense detail rows for one user, oldest first.
///
/// Shared with the weekly report task, hence the plain [`DbErr`] error.
pub async fn user_expense_listing(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<UserExpenseView>, DbErr> {
    let rows = participant::Entity::find()
        .filter(participant::Column::UserId.eq(user_id))
        .find_also_related(expense::Entity)
        .all(db)
        .await?;

    let lender_ids: Vec<i64> = rows
        .iter()
        .filter_map(|(_, exp)| exp.as_ref().map(|e| e.user_id))
        .collect();
    let lenders: HashMap<i64, user::Model> = user::Entity::find()
        .filter(user::Column::UserId.is_in(lender_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.user_id, u))
        .collect();

    let mut listing = Vec::with_capacity(rows.len());
    for (row, exp) in rows {
        let Some(exp) = exp else { continue };
        let Some(lender) = lenders.get(&exp.user_id) else {
            continue;
        };
        listing.push(UserExpenseView {
            name: exp.name,
            created_at: exp.created_at,
            share_cents: row.share_cents,
            lender_id: lender.user_id,
            lender_name: lender.name.clone(),
            lender_email: lender.email.clone(),
            total_cents: exp.amount_cents,
        });
    }
    listing.sort_by_key(|view| view.created_at);
    Ok(listing)
}

/// Handle requests for one user's per-expense detail listing.
///
/// This is the unsimplified read path: a listing, not a net.
pub async fn get_by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserExpenseView>>, ServerError> {
    user::find_by_id(&state.db, user_id).await?;
    let listing = user_expense_listing(&state.db, user_id).await?;
    Ok(Json(listing))
}

/// Handle requests for the aggregated debts implied by one user's shares.
pub async fn get_by_lender(
    State(state): State<ServerState>,
    Path(lender_id): Path<i64>,
) -> Result<Json<NestedBalances>, ServerError> {
    user::find_by_id(&state.db, lender_id).await?;

    let rows = participant::Entity::find()
        .filter(participant::Column::UserId.eq(lender_id))
        .order_by_asc(participant::Column::ParticipantId)
        .find_also_related(expense::Entity)
        .all(&state.db)
        .await?;
    let records = share_records(rows);

    Ok(Json(stringify(engine::raw_balances(records).to_nested())))
}
