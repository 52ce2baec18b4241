use shared::{ClubSubscription, NotificationPreferences};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};

pub const SUBSCRIPTION_COLUMNS: &str = "id, club_id, user_id, subscribed_at, \
    notify_events, notify_announcements, notify_activities, is_active";

pub async fn active_for_user(db: &SqlitePool, user_id: i64) -> AppResult<Vec<ClubSubscription>> {
    let subscriptions = sqlx::query_as::<_, ClubSubscription>(&format!(
        r#"
        SELECT {SUBSCRIPTION_COLUMNS}
        FROM club_subscriptions
        WHERE user_id = ? AND is_active = 1
        ORDER BY id
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(subscriptions)
}

pub async fn find_active(
    db: &SqlitePool,
    club_id: i64,
    user_id: i64,
) -> AppResult<Option<ClubSubscription>> {
    let subscription = sqlx::query_as::<_, ClubSubscription>(&format!(
        r#"
        SELECT {SUBSCRIPTION_COLUMNS}
        FROM club_subscriptions
        WHERE club_id = ? AND user_id = ? AND is_active = 1
        "#
    ))
    .bind(club_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(subscription)
}

const SUBSCRIBE_ATTEMPTS: usize = 5;

/// Inserts an active subscription unless one already exists. The flag is
/// `true` when this call created the row.
pub async fn subscribe(
    db: &SqlitePool,
    club_id: i64,
    user_id: i64,
    preferences: NotificationPreferences,
) -> AppResult<(ClubSubscription, bool)> {
    for attempt in 1..=SUBSCRIBE_ATTEMPTS {
        let inserted = sqlx::query_as::<_, ClubSubscription>(&format!(
            r#"
            INSERT INTO club_subscriptions
                (club_id, user_id, notify_events, notify_announcements, notify_activities)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(club_id)
        .bind(user_id)
        .bind(preferences.events)
        .bind(preferences.announcements)
        .bind(preferences.activities)
        .fetch_optional(db)
        .await?;

        if let Some(subscription) = inserted {
            return Ok((subscription, true));
        }

        if let Some(existing) = find_active(db, club_id, user_id).await? {
            return Ok((existing, false));
        }

        // the conflicting row was unsubscribed in between, so the slot is free again
        tracing::debug!(club_id, user_id, attempt, "Subscription vanished, retrying insert");
    }

    Err(AppError::conflict("Subscription changed concurrently, retry"))
}

/// Physically removes the subscription. `false` when there was none.
pub async fn unsubscribe(db: &SqlitePool, club_id: i64, user_id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM club_subscriptions WHERE club_id = ? AND user_id = ?")
        .bind(club_id)
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_preferences(
    db: &SqlitePool,
    club_id: i64,
    user_id: i64,
    preferences: NotificationPreferences,
) -> AppResult<Option<ClubSubscription>> {
    let subscription = sqlx::query_as::<_, ClubSubscription>(&format!(
        r#"
        UPDATE club_subscriptions
        SET notify_events = ?, notify_announcements = ?, notify_activities = ?
        WHERE club_id = ? AND user_id = ? AND is_active = 1
        RETURNING {SUBSCRIPTION_COLUMNS}
        "#
    ))
    .bind(preferences.events)
    .bind(preferences.announcements)
    .bind(preferences.activities)
    .bind(club_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(subscription)
}

/// Distinct users actively subscribed right now. Not cached.
pub async fn count_subscribers(db: &SqlitePool, club_id: i64) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT user_id)
        FROM club_subscriptions
        WHERE club_id = ? AND is_active = 1
        "#,
    )
    .bind(club_id)
    .fetch_one(db)
    .await?;

    Ok(count)
}
