mod subscription;

pub use subscription::*;

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{ClubSubscription, NotificationPreferences, SubscriptionCount};

use crate::{
    auth::CurrentUser,
    clubs::require_club,
    error::{AppError, AppResult},
    sqlite::Database,
    AppState,
};

#[debug_handler(state = AppState)]
#[tracing::instrument(skip_all, fields(user_id = current.id()))]
pub async fn get_subscriptions(
    State(db): State<Database>,
    current: CurrentUser,
) -> AppResult<Json<Vec<ClubSubscription>>> {
    let subscriptions = active_for_user(db.as_ref(), current.id()).await?;
    Ok(Json(subscriptions))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current), fields(user_id = current.id()))]
pub async fn subscribe_to_club(
    State(db): State<Database>,
    current: CurrentUser,
    Path(club_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    require_club(club_id, db.as_ref()).await?;

    let (subscription, created) = subscribe(
        db.as_ref(),
        club_id,
        current.id(),
        NotificationPreferences::default(),
    )
    .await?;

    if created {
        tracing::info!(subscription_id = subscription.id, "Subscribed to club");
        Ok((StatusCode::CREATED, Json(subscription)))
    } else {
        tracing::debug!(subscription_id = subscription.id, "Already subscribed");
        Ok((StatusCode::OK, Json(subscription)))
    }
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current), fields(user_id = current.id()))]
pub async fn unsubscribe_from_club(
    State(db): State<Database>,
    current: CurrentUser,
    Path(club_id): Path<i64>,
) -> AppResult<StatusCode> {
    if unsubscribe(db.as_ref(), club_id, current.id()).await? {
        tracing::info!("Unsubscribed from club");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Not subscribed to this club"))
    }
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db, current), fields(user_id = current.id()))]
pub async fn update_subscription_preferences(
    State(db): State<Database>,
    current: CurrentUser,
    Path(club_id): Path<i64>,
    Json(preferences): Json<NotificationPreferences>,
) -> AppResult<Json<ClubSubscription>> {
    update_preferences(db.as_ref(), club_id, current.id(), preferences)
        .await?
        .map(Json)
        .ok_or(AppError::not_found("Not subscribed to this club"))
}

#[debug_handler(state = AppState)]
#[tracing::instrument(skip(db))]
pub async fn get_club_subscription_count(
    State(db): State<Database>,
    Path(club_id): Path<i64>,
) -> AppResult<Json<SubscriptionCount>> {
    require_club(club_id, db.as_ref()).await?;
    let count = count_subscribers(db.as_ref(), club_id).await?;
    Ok(Json(SubscriptionCount { club_id, count }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::test::admin_token;
    use crate::clubs::test::{create_club, create_test_club};
    use crate::tests::create_test_server;
    use crate::users::test::create_student;
    use axum_test::TestServer;
    use tracing_test::traced_test;

    async fn subscriptions(server: &TestServer, token: &str) -> Vec<ClubSubscription> {
        let response = server.get("/subscriptions").authorization_bearer(token).await;
        response.assert_status(StatusCode::OK);
        response.json()
    }

    async fn count(server: &TestServer, club_id: i64) -> i64 {
        let response = server
            .get(&format!("/clubs/{club_id}/subscribers/count"))
            .await;
        response.assert_status(StatusCode::OK);
        let count: SubscriptionCount = response.json();
        assert_eq!(count.club_id, club_id);
        count.count
    }

    #[tokio::test]
    #[traced_test]
    async fn test_subscribe_to_club() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let club = create_test_club(&server, &admin).await;
        let (user, token) = create_student(&server, &admin, "student@example.com").await;

        let response = server
            .post(&format!("/clubs/{}/subscription", club.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::CREATED);
        let subscription: ClubSubscription = response.json();
        assert_eq!(subscription.club_id, club.id);
        assert_eq!(subscription.user_id, user.id);
        assert!(subscription.is_active);
        assert_eq!(
            subscription.notification_preferences,
            NotificationPreferences::default()
        );

        let listed = subscriptions(&server, &token).await;
        assert_eq!(listed, vec![subscription]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_subscribe_twice_keeps_one_row() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let club = create_test_club(&server, &admin).await;
        let (_, token) = create_student(&server, &admin, "student@example.com").await;

        let first: ClubSubscription = server
            .post(&format!("/clubs/{}/subscription", club.id))
            .authorization_bearer(&token)
            .await
            .json();
        let response = server
            .post(&format!("/clubs/{}/subscription", club.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::OK);
        let second: ClubSubscription = response.json();

        assert_eq!(first.id, second.id);
        assert_eq!(subscriptions(&server, &token).await.len(), 1);
        assert_eq!(count(&server, club.id).await, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_subscribe_to_missing_club() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;

        let response = server
            .post("/clubs/404/subscription")
            .authorization_bearer(&admin)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unsubscribe_removes_club() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let chess = create_club(&server, &admin, "Chess").await;
        let drama = create_club(&server, &admin, "Drama").await;
        let (_, token) = create_student(&server, &admin, "student@example.com").await;

        for club in [&chess, &drama] {
            server
                .post(&format!("/clubs/{}/subscription", club.id))
                .authorization_bearer(&token)
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .delete(&format!("/clubs/{}/subscription", chess.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let listed = subscriptions(&server, &token).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].club_id, drama.id);

        let response = server
            .delete(&format!("/clubs/{}/subscription", chess.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_subscription_count_is_distinct_users() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let club = create_test_club(&server, &admin).await;
        let other = create_club(&server, &admin, "Other").await;
        let (_, alice) = create_student(&server, &admin, "alice@example.com").await;
        let (_, bob) = create_student(&server, &admin, "bob@example.com").await;

        assert_eq!(count(&server, club.id).await, 0);

        for token in [&alice, &bob, &alice] {
            server
                .post(&format!("/clubs/{}/subscription", club.id))
                .authorization_bearer(token)
                .await;
        }
        server
            .post(&format!("/clubs/{}/subscription", other.id))
            .authorization_bearer(&admin)
            .await;

        assert_eq!(count(&server, club.id).await, 2);
        assert_eq!(count(&server, other.id).await, 1);

        server
            .delete(&format!("/clubs/{}/subscription", club.id))
            .authorization_bearer(&bob)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        assert_eq!(count(&server, club.id).await, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_update_preferences() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let club = create_test_club(&server, &admin).await;
        let (_, token) = create_student(&server, &admin, "student@example.com").await;

        let quiet = NotificationPreferences {
            events: true,
            announcements: false,
            activities: false,
        };

        let response = server
            .put(&format!("/clubs/{}/subscription/preferences", club.id))
            .authorization_bearer(&token)
            .json(&quiet)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        server
            .post(&format!("/clubs/{}/subscription", club.id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .put(&format!("/clubs/{}/subscription/preferences", club.id))
            .authorization_bearer(&token)
            .json(&quiet)
            .await;
        response.assert_status(StatusCode::OK);
        let updated: ClubSubscription = response.json();
        assert_eq!(updated.notification_preferences, quiet);

        let listed = subscriptions(&server, &token).await;
        assert_eq!(listed[0].notification_preferences, quiet);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_deleting_club_drops_subscriptions() {
        let server = create_test_server().await;
        let admin = admin_token(&server).await;
        let club = create_test_club(&server, &admin).await;
        let (_, token) = create_student(&server, &admin, "student@example.com").await;

        server
            .post(&format!("/clubs/{}/subscription", club.id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::CREATED);
        server
            .delete(&format!("/clubs/{}", club.id))
            .authorization_bearer(&admin)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert!(subscriptions(&server, &token).await.is_empty());
    }
}
