use shared::ClubSubscription;

use crate::PortalBackend;

/// The signed-in user's club subscriptions as last seen on the server.
///
/// Every mutation is followed by a full refetch, so the local list is always
/// server truth as of the most recent successful read. Nothing here retries.
pub struct SubscriptionStore<B> {
    backend: B,
    subscriptions: Vec<ClubSubscription>,
}

impl<B: PortalBackend> SubscriptionStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            subscriptions: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn subscriptions(&self) -> &[ClubSubscription] {
        &self.subscriptions
    }

    /// Replaces the local list with the user's active subscriptions. A
    /// failed read leaves the list empty.
    pub async fn fetch_subscriptions(&mut self) -> &[ClubSubscription] {
        self.subscriptions = match self.backend.list_subscriptions().await {
            Ok(subscriptions) => subscriptions
                .into_iter()
                .filter(|s| s.is_active)
                .collect(),
            Err(e) => {
                tracing::error!("Error fetching subscriptions: {}", e);
                Vec::new()
            }
        };
        &self.subscriptions
    }

    pub async fn subscribe_to_club(&mut self, club_id: i64) -> bool {
        match self.backend.subscribe(club_id).await {
            Ok(subscription) => {
                tracing::debug!(club_id, subscription_id = subscription.id, "Subscribed");
                self.fetch_subscriptions().await;
                true
            }
            Err(e) => {
                tracing::error!("Error subscribing to club {}: {}", club_id, e);
                false
            }
        }
    }

    pub async fn unsubscribe_from_club(&mut self, club_id: i64) -> bool {
        match self.backend.unsubscribe(club_id).await {
            Ok(()) => {
                tracing::debug!(club_id, "Unsubscribed");
                self.fetch_subscriptions().await;
                true
            }
            Err(e) => {
                tracing::error!("Error unsubscribing from club {}: {}", club_id, e);
                false
            }
        }
    }

    /// Answers from the last fetch only; does not ask the server.
    pub fn is_subscribed_to_club(&self, club_id: i64) -> bool {
        self.subscriptions.iter().any(|s| s.club_id == club_id)
    }

    /// A fresh count on every call, `0` if the read fails.
    pub async fn club_subscription_count(&self, club_id: i64) -> i64 {
        match self.backend.subscription_count(club_id).await {
            Ok(count) => count.count,
            Err(e) => {
                tracing::warn!("Error counting subscribers of club {}: {}", club_id, e);
                0
            }
        }
    }
}
