use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use sea_orm::DbErr;
use serde::Serialize;

pub use mailer::{Mailer, MailerConfig};
pub use report::spawn_weekly_report;
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod balances;
mod expense;
mod mailer;
mod participant;
mod report;
mod server;
mod user;

pub mod types {
    pub mod user {
        pub use api_types::user::{UserCreated, UserNew, UserView};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseCreated, ExpenseNew, ParticipantNew, SplitKind};
    }

    pub mod balances {
        pub use api_types::NestedBalances;
        pub use api_types::balances::{BalancesQuery, UserExpenseView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Database(DbErr),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidAmount(_) | EngineError::InvalidSplit(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), err.to_string()),
            ServerError::Database(db_err) => {
                tracing::error!("database error: {db_err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<DbErr> for ServerError {
    fn from(value: DbErr) -> Self {
        Self::Database(value)
    }
}
