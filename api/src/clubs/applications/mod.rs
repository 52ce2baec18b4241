mod application;

pub use application::*;

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    clubs::require_club,
    error::{AppError, AppResult},
    sqlite::Database,
    AppState,
};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApplyParams {
    pub motivation: String,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub availability: Option<String>,
    pub expectations: Option<String>,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current, params), fields(user_id = current.id()))]
pub async fn apply_to_club(
    State(db): State<Database>,
    current: CurrentUser,
    Path(club_id): Path<i64>,
    Json(params): Json<ApplyParams>,
) -> AppResult<impl IntoResponse> {
    if params.motivation.trim().is_empty() {
        return Err(AppError::bad_request("Motivation is required"));
    }
    require_club(club_id, db.as_ref()).await?;

    let application = sqlx::query_as::<_, ClubMembershipApplication>(&format!(
        r#"
        INSERT INTO club_membership_application
            (club_id, applicant_id, motivation, experience, skills, availability, expectations)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {APPLICATION_COLUMNS}
        "#
    ))
    .bind(club_id)
    .bind(current.id())
    .bind(params.motivation)
    .bind(params.experience)
    .bind(params.skills)
    .bind(params.availability)
    .bind(params.expectations)
    .fetch_one(db.as_ref())
    .await
    .map_err(|err| match AppError::from(err) {
        AppError::Conflict(_) => {
            AppError::conflict("A pending application for this club already exists")
        }
        other => other,
    })?;

    tracing::info!(application_id = application.id, "Application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn get_club_applications(
    State(db): State<Database>,
    current: CurrentUser,
    Path(club_id): Path<i64>,
) -> AppResult<Json<Vec<ClubMembershipApplication>>> {
    current.require_admin()?;
    require_club(club_id, db.as_ref()).await?;

    let applications = sqlx::query_as::<_, ClubMembershipApplication>(&format!(
        r#"
        SELECT {APPLICATION_COLUMNS}
        FROM club_membership_application
        WHERE club_id = ?
        ORDER BY application_date, id
        "#
    ))
    .bind(club_id)
    .fetch_all(db.as_ref())
    .await?;

    Ok(Json(applications))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip_all, fields(user_id = current.id()))]
pub async fn get_my_applications(
    State(db): State<Database>,
    current: CurrentUser,
) -> AppResult<Json<Vec<ClubMembershipApplication>>> {
    let applications = sqlx::query_as::<_, ClubMembershipApplication>(&format!(
        r#"
        SELECT {APPLICATION_COLUMNS}
        FROM club_membership_application
        WHERE applicant_id = ?
        ORDER BY id
        "#
    ))
    .bind(current.id())
    .fetch_all(db.as_ref())
    .await?;

    Ok(Json(applications))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn approve_application(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ClubMembershipApplication>> {
    current.require_admin()?;
    let application = transition(db.as_ref(), id, ApplicationStatus::Approved).await?;
    tracing::info!(club_id = application.club_id, "Application approved");
    Ok(Json(application))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn reject_application(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ClubMembershipApplication>> {
    current.require_admin()?;
    let application = transition(db.as_ref(), id, ApplicationStatus::Rejected).await?;
    Ok(Json(application))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current), fields(user_id = current.id()))]
pub async fn withdraw_application(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ClubMembershipApplication>> {
    let application = find_application(id, db.as_ref())
        .await?
        .ok_or(AppError::not_found("Application not found"))?;
    if application.applicant_id != current.id() {
        return Err(AppError::forbidden("Only the applicant can withdraw"));
    }

    let application = transition(db.as_ref(), id, ApplicationStatus::Withdrawn).await?;
    Ok(Json(application))
}
