//! Registration review for administrators. New student accounts stay
//! `pending` until an admin approves or rejects them here.

use axum::{
    debug_handler,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    sqlite::Database,
    users::{RegistrationStatus, User, USER_COLUMNS},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/registrations/pending", get(get_pending_registrations))
        .route(
            "/registrations/{id}/approve",
            post(approve_user_registration),
        )
        .route("/registrations/{id}/reject", post(reject_user_registration))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip_all)]
pub async fn get_pending_registrations(
    State(db): State<Database>,
    current: CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    current.require_admin()?;

    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE registration_status = ? ORDER BY created_at, id"
    ))
    .bind(RegistrationStatus::Pending)
    .fetch_all(db.as_ref())
    .await?;

    Ok(Json(users))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn approve_user_registration(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    current.require_admin()?;
    review(&db, id, RegistrationStatus::Approved).await.map(Json)
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn reject_user_registration(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    current.require_admin()?;
    review(&db, id, RegistrationStatus::Rejected).await.map(Json)
}

// Only pending registrations move; anything else is a conflict.
async fn review(db: &Database, id: i64, outcome: RegistrationStatus) -> AppResult<User> {
    let updated = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET registration_status = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ? AND registration_status = ?
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(outcome)
    .bind(id)
    .bind(RegistrationStatus::Pending)
    .fetch_optional(db.as_ref())
    .await?;

    match updated {
        Some(user) => {
            tracing::info!(user_id = user.id, ?outcome, "Registration reviewed");
            Ok(user)
        }
        None => match User::from_id(id, db.as_ref()).await? {
            Some(_) => Err(AppError::conflict("Registration is not pending")),
            None => Err(AppError::not_found("User not found")),
        },
    }
}
