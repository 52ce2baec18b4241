mod session;

pub use session::*;

use axum::{
    debug_handler,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    sqlite::Database,
    users::{RegistrationStatus, User, USER_COLUMNS},
    AppState,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Accounts registered with these emails are admins from the start.
    pub admin_emails: Vec<String>,
}

impl Settings {
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn router() -> Router<AppState> {
    Router::<AppState>::new().route("/sessions", post(create_session).delete(delete_session))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateSessionParams {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Opens a session for an approved user identified by email alone.
///
/// This stands in for the hosted auth provider the portal sits behind: there
/// is no password or identity check, so anyone who knows an address gets its
/// session. Not safe to expose as a real login; keep it behind the provider
/// or limited to development and tests.
#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn create_session(
    State(db): State<Database>,
    Json(params): Json<CreateSessionParams>,
) -> AppResult<impl IntoResponse> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(&params.email)
    .fetch_optional(db.as_ref())
    .await?
    .ok_or(AppError::Unauthorized)?;

    match user.registration_status {
        RegistrationStatus::Approved => {}
        RegistrationStatus::Pending => {
            return Err(AppError::forbidden("Registration pending approval"))
        }
        RegistrationStatus::Rejected => {
            return Err(AppError::forbidden("Registration was rejected"))
        }
    }

    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
        .bind(&token)
        .bind(user.id)
        .execute(db.as_ref())
        .await?;
    tracing::info!(user_id = user.id, "Session created");

    Ok((StatusCode::CREATED, Json(Session { token, user })))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip_all)]
pub async fn delete_session(
    State(db): State<Database>,
    current: CurrentUser,
) -> AppResult<StatusCode> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(&current.token)
        .execute(db.as_ref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
