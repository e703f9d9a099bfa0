//! User API endpoints and the `users` entity.

use api_types::user::{UserCreated, UserNew, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::EngineError;
use sea_orm::{ActiveValue, entity::prelude::*};
use unicode_normalization::UnicodeNormalization;

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Loads a user or fails with the 404-mapped engine error.
pub async fn find_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Model, ServerError> {
    Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServerError::Engine(EngineError::KeyNotFound(format!("user {user_id}"))))
}

fn validate(payload: &UserNew) -> Result<(), ServerError> {
    if payload.name.trim().is_empty() {
        return Err(ServerError::Generic("name must not be empty".to_string()));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ServerError::Generic("invalid email".to_string()));
    }
    if payload.mobile_number.len() != 10
        || !payload.mobile_number.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ServerError::Generic(
            "mobile number must be 10 digits".to_string(),
        ));
    }
    Ok(())
}

/// Handle requests for creating a new user.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    validate(&payload)?;

    let email = payload.email.trim().to_string();
    if Entity::find()
        .filter(Column::Email.eq(email.clone()))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(ServerError::Engine(EngineError::ExistingKey(email)));
    }

    let user = ActiveModel {
        user_id: ActiveValue::NotSet,
        name: ActiveValue::Set(payload.name.trim().nfc().collect()),
        email: ActiveValue::Set(email),
        mobile_number: ActiveValue::Set(payload.mobile_number),
    };
    let user = user.insert(&state.db).await?;

    tracing::info!(user_id = user.user_id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            user_id: user.user_id,
        }),
    ))
}

/// Handle requests for fetching a single user.
pub async fn get(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserView>, ServerError> {
    let user = find_by_id(&state.db, user_id).await?;

    Ok(Json(UserView {
        user_id: user.user_id,
        name: user.name,
        email: user.email,
        mobile_number: user.mobile_number,
    }))
}
