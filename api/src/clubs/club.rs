use sqlx::SqlitePool;

pub use shared::Club;

use crate::error::{AppError, AppResult};

pub const CLUB_COLUMNS: &str = "id, name, description, created_at, updated_at";

pub async fn find_club(id: i64, db: &SqlitePool) -> AppResult<Option<Club>> {
    let club = sqlx::query_as::<_, Club>(&format!(
        "SELECT {CLUB_COLUMNS} FROM clubs WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(club)
}

/// Like [`find_club`] but a missing club is a 404.
pub async fn require_club(id: i64, db: &SqlitePool) -> AppResult<Club> {
    find_club(id, db)
        .await?
        .ok_or(AppError::not_found("Club not found"))
}
