mod membership;
mod view;

pub use membership::*;
pub use view::*;

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    sqlite::Database,
};
use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::ClubMembershipView;
use sqlx::{QueryBuilder, Sqlite};

use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateMembershipParams {
    user_id: i64,
    club_id: i64,
    role: MembershipRole,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn create_membership(
    State(db): State<Database>,
    current: CurrentUser,
    Json(CreateMembershipParams {
        user_id,
        club_id,
        role,
    }): Json<CreateMembershipParams>,
) -> AppResult<impl IntoResponse> {
    current.require_admin()?;

    let membership = sqlx::query_as::<_, ClubMembership>(&format!(
        r#"
        INSERT INTO club_memberships (user_id, club_id, role)
        VALUES (?, ?, ?)
        RETURNING {MEMBERSHIP_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(club_id)
    .bind(role)
    .fetch_one(db.as_ref())
    .await
    .map_err(|err| match AppError::from(err) {
        AppError::Conflict(_) => AppError::conflict("User is already a member of this club"),
        AppError::NotFound(_) => AppError::not_found("Unknown user or club"),
        other => other,
    })?;

    Ok((StatusCode::CREATED, Json(membership)).into_response())
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current))]
pub async fn delete_membership(
    State(db): State<Database>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    current.require_admin()?;

    let result = sqlx::query("DELETE FROM club_memberships WHERE id = ?")
        .bind(id)
        .execute(db.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Ok((StatusCode::NOT_FOUND, "Membership not found").into_response());
    }

    Ok((StatusCode::OK, "Membership deleted successfully").into_response())
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MembershipFilter {
    club_id: Option<i64>,
    user_id: Option<i64>,
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_memberships(
    State(db): State<Database>,
    Query(filter): Query<MembershipFilter>,
) -> AppResult<Json<Vec<ClubMembership>>> {
    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {MEMBERSHIP_COLUMNS} FROM club_memberships WHERE 1 = 1"
    ));
    if let Some(club_id) = filter.club_id {
        query.push(" AND club_id = ").push_bind(club_id);
    }
    if let Some(user_id) = filter.user_id {
        query.push(" AND user_id = ").push_bind(user_id);
    }
    query.push(" ORDER BY id");

    let memberships = query
        .build_query_as::<ClubMembership>()
        .fetch_all(db.as_ref())
        .await?;

    Ok(Json(memberships))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_membership_by_id(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    match find_membership(id, db.as_ref()).await? {
        Some(m) => Ok(Json(m).into_response()),
        None => Ok((StatusCode::NOT_FOUND, "Membership not found").into_response()),
    }
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_user_memberships(
    State(db): State<Database>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<ClubMembershipView>>> {
    let views = memberships_for_user(db.as_ref(), user_id).await?;
    Ok(Json(views))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::test::admin_token;
    use crate::clubs::applications::test::{apply, approve};
    use crate::clubs::test::{create_club, create_test_club};
    use crate::tests::create_test_server;
    use crate::users::test::{create_student, create_test_user};
    use axum_test::TestServer;
    use shared::MembershipSource;
    use tracing_test::traced_test;

    async fn create_membership(
        server: &TestServer,
        admin: &str,
        user_id: i64,
        club_id: i64,
    ) -> ClubMembership {
        let response = server
            .post("/memberships")
            .authorization_bearer(admin)
            .json(&CreateMembershipParams {
                user_id,
                club_id,
                role: MembershipRole::Member,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    async fn user_memberships(server: &TestServer, user_id: i64) -> Vec<ClubMembershipView> {
        let response = server.get(&format!("/users/{user_id}/memberships")).await;
        response.assert_status(StatusCode::OK);
        response.json()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_membership() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let user = create_test_user(&server).await;
        let club = create_test_club(&server, &admin).await;

        let membership = create_membership(&server, &admin, user.id, club.id).await;
        assert_eq!(membership.user_id, user.id);
        assert_eq!(membership.club_id, club.id);
        assert_eq!(membership.role, MembershipRole::Member);
        assert_eq!(membership.status, MembershipStatus::Active);

        let response = server
            .post("/memberships")
            .authorization_bearer(&admin)
            .json(&CreateMembershipParams {
                user_id: user.id,
                club_id: club.id,
                role: MembershipRole::Officer,
            })
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_membership_unknown_club() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let user = create_test_user(&server).await;

        let response = server
            .post("/memberships")
            .authorization_bearer(&admin)
            .json(&CreateMembershipParams {
                user_id: user.id,
                club_id: 77,
                role: MembershipRole::Member,
            })
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_filter_memberships() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let user = create_test_user(&server).await;
        let chess = create_club(&server, &admin, "Chess").await;
        let drama = create_club(&server, &admin, "Drama").await;
        create_membership(&server, &admin, user.id, chess.id).await;
        create_membership(&server, &admin, user.id, drama.id).await;

        let response = server
            .get("/memberships")
            .add_query_param("club_id", drama.id)
            .await;
        response.assert_status(StatusCode::OK);
        let memberships: Vec<ClubMembership> = response.json();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].club_id, drama.id);

        let all: Vec<ClubMembership> = server.get("/memberships").await.json();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_delete_membership() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let user = create_test_user(&server).await;
        let club = create_test_club(&server, &admin).await;
        let membership = create_membership(&server, &admin, user.id, club.id).await;

        let response = server
            .delete(&format!("/memberships/{}", membership.id))
            .authorization_bearer(&admin)
            .await;
        assert_eq!(response.status_code(), 200);

        let response = server.get(&format!("/memberships/{}", membership.id)).await;
        assert_eq!(response.status_code(), 404);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_view_prefers_explicit_memberships() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (user, token) = create_student(&server, &admin, "student@example.com").await;
        let chess = create_club(&server, &admin, "Chess").await;
        let drama = create_club(&server, &admin, "Drama").await;

        create_membership(&server, &admin, user.id, chess.id).await;
        let application = apply(&server, &token, drama.id).await;
        approve(&server, &admin, application.id).await;

        let views = user_memberships(&server, user.id).await;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].source, MembershipSource::Membership);
        assert_eq!(views[0].club, chess);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_view_synthesizes_from_approved_application() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let (user, token) = create_student(&server, &admin, "student@example.com").await;
        let club = create_test_club(&server, &admin).await;
        let other = create_club(&server, &admin, "Other").await;

        let application = apply(&server, &token, club.id).await;
        approve(&server, &admin, application.id).await;
        // still pending, so it must not show up
        apply(&server, &token, other.id).await;

        let views = user_memberships(&server, user.id).await;
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.source, MembershipSource::Application);
        assert_eq!(view.club, club);
        assert_eq!(view.membership.club_id, club.id);
        assert_eq!(view.membership.user_id, user.id);
        assert_eq!(view.membership.role, MembershipRole::Member);

        // the stand-in is never written back
        let stored: Vec<ClubMembership> = server
            .get("/memberships")
            .add_query_param("user_id", user.id)
            .await
            .json();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_view_empty_for_new_user() {
        let server = create_test_server().await;
        let user = create_test_user(&server).await;
        assert!(user_memberships(&server, user.id).await.is_empty());
    }
}
