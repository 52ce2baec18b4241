pub use shared::{ApplicationStatus, ClubMembershipApplication};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};

pub const APPLICATION_COLUMNS: &str = "id, club_id, applicant_id, motivation, experience, \
    skills, availability, expectations, status, application_date, reviewed_at";

pub async fn find_application(
    id: i64,
    db: &SqlitePool,
) -> AppResult<Option<ClubMembershipApplication>> {
    let application = sqlx::query_as::<_, ClubMembershipApplication>(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM club_membership_application WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(application)
}

/// Moves a pending application to `outcome`. Reviews by an admin stamp
/// `reviewed_at`; a withdrawal by the applicant does not.
pub async fn transition(
    db: &SqlitePool,
    id: i64,
    outcome: ApplicationStatus,
) -> AppResult<ClubMembershipApplication> {
    let reviewed = matches!(
        outcome,
        ApplicationStatus::Approved | ApplicationStatus::Rejected
    );

    let updated = sqlx::query_as::<_, ClubMembershipApplication>(&format!(
        r#"
        UPDATE club_membership_application
        SET status = ?,
            reviewed_at = CASE WHEN ? THEN CURRENT_TIMESTAMP ELSE reviewed_at END
        WHERE id = ? AND status = ?
        RETURNING {APPLICATION_COLUMNS}
        "#
    ))
    .bind(outcome)
    .bind(reviewed)
    .bind(id)
    .bind(ApplicationStatus::Pending)
    .fetch_optional(db)
    .await?;

    match updated {
        Some(application) => Ok(application),
        None => match find_application(id, db).await? {
            Some(_) => Err(AppError::conflict("Application is no longer pending")),
            None => Err(AppError::not_found("Application not found")),
        },
    }
}
