mod user;

use serde::{Deserialize, Serialize};
pub use user::*;

use crate::{
    auth::{self, CurrentUser},
    error::{AppError, AppResult},
    sqlite::Database,
};
use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::{QueryBuilder, Sqlite};

use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateUserParams {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, auth))]
pub async fn create_user(
    State(db): State<Database>,
    State(auth): State<auth::Settings>,
    Json(params): Json<CreateUserParams>,
) -> AppResult<impl IntoResponse> {
    if params.email.trim().is_empty() {
        return Err(AppError::bad_request("Email is required"));
    }

    // admins skip the approval queue
    let (role, status) = if auth.is_admin_email(&params.email) {
        (UserRole::Admin, RegistrationStatus::Approved)
    } else {
        (UserRole::Student, RegistrationStatus::Pending)
    };

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, first_name, last_name, role, registration_status)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&params.email)
    .bind(&params.first_name)
    .bind(&params.last_name)
    .bind(role)
    .bind(status)
    .fetch_one(db.as_ref())
    .await
    .map_err(|err| match AppError::from(err) {
        AppError::Conflict(_) => AppError::conflict("Email already registered"),
        other => other,
    })?;

    tracing::info!(user_id = user.id, ?role, "Registered user");
    Ok(Json(user))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_users(State(db): State<Database>) -> AppResult<Json<Vec<User>>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id"
    ))
    .fetch_all(db.as_ref())
    .await?;

    Ok(Json(users))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_user_by_id(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    match User::from_id(id, db.as_ref()).await? {
        Some(user) => Ok(Json(user).into_response()),
        None => Ok((StatusCode::NOT_FOUND, "User not found").into_response()),
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateUserParams {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn update_user(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(params): Json<UpdateUserParams>,
) -> AppResult<Json<User>> {
    current.require_self_or_admin(id)?;

    let mut query = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
    let mut separated = query.separated(", ");
    if let Some(email) = params.email {
        separated.push("email = ");
        separated.push_bind_unseparated(email);
    }
    if let Some(first_name) = params.first_name {
        separated.push("first_name = ");
        separated.push_bind_unseparated(first_name);
    }
    if let Some(last_name) = params.last_name {
        separated.push("last_name = ");
        separated.push_bind_unseparated(last_name);
    }
    separated.push("updated_at = CURRENT_TIMESTAMP");
    query.push(" WHERE id = ");
    query.push_bind(id);
    tracing::debug!("Query: {}", query.sql());
    query.build().execute(db.as_ref()).await?;

    let user = User::from_id(id, db.as_ref())
        .await?
        .ok_or(AppError::not_found("User not found"))?;

    Ok(Json(user))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn delete_user(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    current.require_self_or_admin(id)?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db.as_ref())
        .await?;

    match result.rows_affected() {
        0 => Ok((StatusCode::NOT_FOUND, "User not found")),
        1 => Ok((StatusCode::NO_CONTENT, "User successfully deleted")),
        _ => Ok((StatusCode::INTERNAL_SERVER_ERROR, "Multiple users deleted")),
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FindUserParams {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn find_users(
    Query(params): Query<FindUserParams>,
    State(db): State<Database>,
) -> Response {
    if params.email.is_none() && params.first_name.is_none() && params.last_name.is_none() {
        return (StatusCode::BAD_REQUEST, "No search parameters provided").into_response();
    }
    let mut query =
        QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users WHERE "));
    let mut separated = query.separated(" AND ");
    if let Some(email) = params.email {
        separated.push("email = ");
        separated.push_bind_unseparated(email);
    }
    if let Some(first_name) = params.first_name {
        separated.push("first_name = ");
        separated.push_bind_unseparated(first_name);
    }
    if let Some(last_name) = params.last_name {
        separated.push("last_name = ");
        separated.push_bind_unseparated(last_name);
    }
    query.push(" ORDER BY id");

    tracing::debug!("Query: {}", query.sql());

    let db_result = query.build_query_as::<User>().fetch_all(db.as_ref()).await;

    match db_result {
        Ok(users) if users.is_empty() => {
            (StatusCode::NOT_FOUND, "No users found").into_response()
        }
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => {
            tracing::error!("Error fetching users: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching users").into_response()
        }
    }
}
