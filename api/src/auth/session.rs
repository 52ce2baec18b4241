use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_auth::AuthBearer;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    sqlite::Database,
    users::{User, USER_COLUMNS},
};

const TOKEN_LENGTH: usize = 32;

pub fn generate_token() -> String {
    let mut rng = thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(TOKEN_LENGTH)
        .collect()
}

pub async fn user_for_token(db: &SqlitePool, token: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE id = (SELECT user_id FROM sessions WHERE token = ?)
        "#
    ))
    .bind(token)
    .fetch_optional(db)
    .await?;

    Ok(user)
}

/// The user behind the request's `Authorization: Bearer` session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.user.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin access required"))
        }
    }

    /// Passes for the user themselves or any admin.
    pub fn require_self_or_admin(&self, user_id: i64) -> AppResult<()> {
        if self.user.id == user_id || self.user.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Not allowed to modify this user"))
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthBearer(token) = AuthBearer::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let db = Database::from_ref(state);
        match user_for_token(db.as_ref(), &token).await? {
            Some(user) => Ok(CurrentUser { user, token }),
            None => {
                tracing::debug!("Rejected unknown session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
