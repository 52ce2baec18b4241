use shared::ClubMembershipView;

use crate::PortalBackend;

/// The user's clubs, explicit memberships first and approved applications
/// as the fallback (the server does the reconciling). Empty on failure.
pub async fn fetch_memberships<B: PortalBackend>(
    backend: &B,
    user_id: i64,
) -> Vec<ClubMembershipView> {
    match backend.user_memberships(user_id).await {
        Ok(views) => views,
        Err(e) => {
            tracing::error!("Error fetching memberships for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}
