use serde::{Deserialize, Serialize};
use shared::{ClubMembershipView, ClubSubscription, SubscriptionCount};

use crate::PortalBackend;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub base_url: String,
}

/// Talks to the portal API over HTTP with a bearer session token.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    settings: Settings,
    client: reqwest::Client,
    token: String,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    token: String,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client, settings: Settings, token: impl Into<String>) -> Self {
        Self {
            settings,
            client,
            token: token.into(),
        }
    }

    /// Opens a session for `email` and returns a backend bound to it.
    pub async fn login(
        client: reqwest::Client,
        settings: Settings,
        email: &str,
    ) -> Result<Self, reqwest::Error> {
        let url = format!("{}/auth/sessions", settings.base_url.trim_end_matches('/'));
        tracing::info!("Portal login: {}", url);
        let session: SessionResponse = client
            .post(url)
            .json(&SessionRequest { email })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Self::new(client, settings, session.token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

impl PortalBackend for HttpBackend {
    type Error = reqwest::Error;

    async fn list_subscriptions(&self) -> Result<Vec<ClubSubscription>, Self::Error> {
        self.client
            .get(self.url("/subscriptions"))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn subscribe(&self, club_id: i64) -> Result<ClubSubscription, Self::Error> {
        self.client
            .post(self.url(&format!("/clubs/{club_id}/subscription")))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn unsubscribe(&self, club_id: i64) -> Result<(), Self::Error> {
        self.client
            .delete(self.url(&format!("/clubs/{club_id}/subscription")))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn subscription_count(&self, club_id: i64) -> Result<SubscriptionCount, Self::Error> {
        self.client
            .get(self.url(&format!("/clubs/{club_id}/subscribers/count")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn user_memberships(
        &self,
        user_id: i64,
    ) -> Result<Vec<ClubMembershipView>, Self::Error> {
        self.client
            .get(self.url(&format!("/users/{user_id}/memberships")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
