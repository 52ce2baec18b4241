pub use shared::{ClubMembership, MembershipRole, MembershipStatus};
use sqlx::SqlitePool;

use crate::error::AppResult;

pub const MEMBERSHIP_COLUMNS: &str = "id, club_id, user_id, role, joined_at, status";

pub async fn find_membership(id: i64, db: &SqlitePool) -> AppResult<Option<ClubMembership>> {
    let membership = sqlx::query_as::<_, ClubMembership>(&format!(
        r#"
        SELECT {MEMBERSHIP_COLUMNS}
        FROM club_memberships
        WHERE id = ?
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(membership)
}
