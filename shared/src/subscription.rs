use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which kinds of club news a subscriber wants to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NotificationPreferences {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "notify_events"))]
    pub events: bool,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "notify_announcements"))]
    pub announcements: bool,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "notify_activities"))]
    pub activities: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            events: true,
            announcements: true,
            activities: true,
        }
    }
}

/// A user's opt-in to notifications from a club. Independent of membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ClubSubscription {
    pub id: i64,
    pub club_id: i64,
    pub user_id: i64,
    pub subscribed_at: NaiveDateTime,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub notification_preferences: NotificationPreferences,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCount {
    pub club_id: i64,
    pub count: i64,
}
