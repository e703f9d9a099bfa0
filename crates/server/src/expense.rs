//! Expense API endpoint and the `expenses` entity.
//!
//! Creating an expense is where shares get finalized: the handler validates
//! the request, runs the split arithmetic, persists one participant row per
//! share and notifies every participant by email. From then on the balance
//! engine only ever sees the stored `(payer, debtor, share)` rows.

use std::collections::HashMap;

use api_types::expense::{ExpenseCreated, ExpenseNew, SplitKind as ApiSplitKind};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::{EngineError, MoneyCents, SplitKind, split_shares};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{ServerError, participant, server::ServerState, user};

/// Ceiling on a single expense, in cents.
const MAX_TOTAL_CENTS: i64 = 10_000_000_000;
const MAX_PARTICIPANTS: usize = 1000;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub expense_id: i64,
    pub name: String,
    /// The payer: every participant's share is owed back to this user.
    pub user_id: i64,
    pub amount_cents: i64,
    pub split_kind: String,
    pub total_shares: i64,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::UserId"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn split_kind(kind: ApiSplitKind) -> SplitKind {
    match kind {
        ApiSplitKind::Equal => SplitKind::Equal,
        ApiSplitKind::Exact => SplitKind::Exact,
        ApiSplitKind::Percent => SplitKind::Percent,
    }
}

/// Handle requests for creating a new expense.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    if payload.total_cents > MAX_TOTAL_CENTS {
        return Err(ServerError::Generic("maximum amount exceeded".to_string()));
    }
    if payload.participants.len() > MAX_PARTICIPANTS {
        return Err(ServerError::Generic(
            "maximum number of participants exceeded".to_string(),
        ));
    }

    let lender = user::find_by_id(&state.db, payload.lender_id).await?;

    // One lookup for all participants; anyone missing is a 404.
    let ids: Vec<i64> = payload.participants.iter().map(|p| p.user_id).collect();
    let participants: HashMap<i64, user::Model> = user::Entity::find()
        .filter(user::Column::UserId.is_in(ids.clone()))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.user_id, u))
        .collect();
    for id in &ids {
        if !participants.contains_key(id) {
            return Err(ServerError::Engine(EngineError::KeyNotFound(format!(
                "user {id}"
            ))));
        }
    }

    let kind = split_kind(payload.split_kind);
    let declared: Vec<Option<i64>> = payload.participants.iter().map(|p| p.share).collect();
    let shares = split_shares(kind, MoneyCents::new(payload.total_cents), &declared)?;

    let expense = ActiveModel {
        expense_id: ActiveValue::NotSet,
        name: ActiveValue::Set(payload.name.clone()),
        user_id: ActiveValue::Set(payload.lender_id),
        amount_cents: ActiveValue::Set(payload.total_cents),
        split_kind: ActiveValue::Set(kind.as_str().to_string()),
        total_shares: ActiveValue::Set(shares.len() as i64),
        created_at: ActiveValue::Set(Utc::now()),
        notes: ActiveValue::Set(payload.notes),
    };
    let expense = expense.insert(&state.db).await?;

    for (p, share) in payload.participants.iter().zip(&shares) {
        let row = participant::ActiveModel {
            participant_id: ActiveValue::NotSet,
            expense_id: ActiveValue::Set(expense.expense_id),
            user_id: ActiveValue::Set(p.user_id),
            share_cents: ActiveValue::Set(share.cents()),
        };
        row.insert(&state.db).await?;
    }

    tracing::info!(
        expense_id = expense.expense_id,
        lender_id = expense.user_id,
        "expense created"
    );

    for (p, share) in payload.participants.iter().zip(&shares) {
        let Some(recipient) = participants.get(&p.user_id) else {
            continue;
        };
        let subject = format!("Expense Created: {} by {}", expense.name, lender.name);
        let body = format!(
            "An expense named '{}' has been created with a total amount of {} and your share: {}",
            expense.name,
            MoneyCents::new(expense.amount_cents),
            share,
        );
        state
            .mailer
            .deliver(&state.db, &recipient.email, &subject, &body)
            .await;
    }

    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            expense_id: expense.expense_id,
        }),
    ))
}
