pub mod applications;
mod club;
pub mod memberships;
pub mod subscriptions;

pub use club::*;

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    AppState,
};
use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use crate::sqlite::Database;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateClubParams {
    name: String,
    description: String,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn create_club(
    State(db): State<Database>,
    current: CurrentUser,
    Json(CreateClubParams { name, description }): Json<CreateClubParams>,
) -> AppResult<impl IntoResponse> {
    current.require_admin()?;
    if name.trim().is_empty() {
        return Err(AppError::bad_request("Club name is required"));
    }

    let club = sqlx::query_as::<_, Club>(&format!(
        r#"
        INSERT INTO clubs (name, description)
        VALUES (?, ?)
        RETURNING {CLUB_COLUMNS}
        "#
    ))
    .bind(name)
    .bind(description)
    .fetch_one(db.as_ref())
    .await?;

    Ok((StatusCode::CREATED, Json(club)).into_response())
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateClubParams {
    name: Option<String>,
    description: Option<String>,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn update_club(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(params): Json<UpdateClubParams>,
) -> AppResult<Json<Club>> {
    current.require_admin()?;

    let mut query = QueryBuilder::<Sqlite>::new("UPDATE clubs SET ");
    let mut separated = query.separated(", ");
    if let Some(name) = params.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }
    if let Some(description) = params.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
    }
    separated.push("updated_at = CURRENT_TIMESTAMP");
    query.push(" WHERE id = ");
    query.push_bind(id);
    tracing::debug!("Query: {}", query.sql());
    query.build().execute(db.as_ref()).await?;

    let club = require_club(id, db.as_ref()).await?;

    Ok(Json(club))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_clubs(State(db): State<Database>) -> AppResult<Json<Vec<Club>>> {
    let clubs = sqlx::query_as::<_, Club>(&format!(
        "SELECT {CLUB_COLUMNS} FROM clubs ORDER BY id"
    ))
    .fetch_all(db.as_ref())
    .await?;

    Ok(Json(clubs))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_club_by_id(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    match find_club(id, db.as_ref()).await? {
        Some(club) => Ok(Json(club).into_response()),
        None => Ok((StatusCode::NOT_FOUND, "Club not found").into_response()),
    }
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn delete_club(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    current.require_admin()?;

    let result = sqlx::query("DELETE FROM clubs WHERE id = ?")
        .bind(id)
        .execute(db.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Ok((StatusCode::NOT_FOUND, "Club not found").into_response());
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}
