use std::fmt::Display;

use shared::{ClubMembershipView, ClubSubscription, SubscriptionCount};

/// The remote calls the store needs. Each call is one independent round
/// trip with no retries.
pub trait PortalBackend {
    type Error: Display;

    async fn list_subscriptions(&self) -> Result<Vec<ClubSubscription>, Self::Error>;

    async fn subscribe(&self, club_id: i64) -> Result<ClubSubscription, Self::Error>;

    async fn unsubscribe(&self, club_id: i64) -> Result<(), Self::Error>;

    async fn subscription_count(&self, club_id: i64) -> Result<SubscriptionCount, Self::Error>;

    async fn user_memberships(&self, user_id: i64)
        -> Result<Vec<ClubMembershipView>, Self::Error>;
}
