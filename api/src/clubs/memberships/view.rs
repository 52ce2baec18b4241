//! The reconciled "which clubs is this person in" read.
//!
//! Explicit membership rows win. Only when a user has none do their
//! approved applications stand in for memberships, and those stand-ins are
//! rebuilt on every read rather than written back.

use std::collections::HashMap;

use shared::{
    ApplicationStatus, Club, ClubMembership, ClubMembershipApplication, ClubMembershipView,
    MembershipSource,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    clubs::{applications::APPLICATION_COLUMNS, CLUB_COLUMNS},
    error::AppResult,
};

use super::MEMBERSHIP_COLUMNS;

pub async fn memberships_for_user(
    db: &SqlitePool,
    user_id: i64,
) -> AppResult<Vec<ClubMembershipView>> {
    let explicit = sqlx::query_as::<_, ClubMembership>(&format!(
        "SELECT {MEMBERSHIP_COLUMNS} FROM club_memberships WHERE user_id = ? ORDER BY club_id"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let (memberships, source) = if explicit.is_empty() {
        let approved = sqlx::query_as::<_, ClubMembershipApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM club_membership_application
            WHERE applicant_id = ? AND status = ?
            ORDER BY club_id, id
            "#
        ))
        .bind(user_id)
        .bind(ApplicationStatus::Approved)
        .fetch_all(db)
        .await?;
        tracing::debug!(
            user_id,
            approved = approved.len(),
            "No explicit memberships, falling back to approved applications"
        );
        (
            synthesize_memberships(&approved),
            MembershipSource::Application,
        )
    } else {
        (explicit, MembershipSource::Membership)
    };

    let ids = memberships.iter().map(|m| m.club_id).collect::<Vec<_>>();
    let clubs = clubs_by_id(db, &ids).await?;

    Ok(memberships
        .into_iter()
        .filter_map(|membership| {
            let club = clubs.get(&membership.club_id)?.clone();
            Some(ClubMembershipView {
                membership,
                source,
                club,
            })
        })
        .collect())
}

/// One membership per club, taking the earliest approved application.
pub fn synthesize_memberships(approved: &[ClubMembershipApplication]) -> Vec<ClubMembership> {
    let mut seen = HashMap::new();
    for application in approved
        .iter()
        .filter(|a| a.status == ApplicationStatus::Approved)
    {
        seen.entry(application.club_id)
            .or_insert_with(|| application.as_membership());
    }
    let mut memberships = seen.into_values().collect::<Vec<_>>();
    memberships.sort_by_key(|m| m.club_id);
    memberships
}

async fn clubs_by_id(db: &SqlitePool, ids: &[i64]) -> AppResult<HashMap<i64, Club>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query =
        QueryBuilder::<Sqlite>::new(format!("SELECT {CLUB_COLUMNS} FROM clubs WHERE id IN ("));
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    tracing::debug!("Query: {}", query.sql());

    let clubs = query.build_query_as::<Club>().fetch_all(db).await?;
    Ok(clubs.into_iter().map(|club| (club.id, club)).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use shared::MembershipRole;

    fn application(id: i64, club_id: i64, status: ApplicationStatus) -> ClubMembershipApplication {
        ClubMembershipApplication {
            id,
            club_id,
            applicant_id: 1,
            motivation: "Because".to_string(),
            experience: None,
            skills: None,
            availability: None,
            expectations: None,
            status,
            application_date: NaiveDate::from_ymd_opt(2024, 1, id as u32)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            reviewed_at: None,
        }
    }

    #[test]
    fn test_synthesize_one_per_club() {
        let approved = vec![
            application(1, 5, ApplicationStatus::Approved),
            application(2, 5, ApplicationStatus::Approved),
            application(3, 2, ApplicationStatus::Approved),
            application(4, 9, ApplicationStatus::Rejected),
        ];

        let memberships = synthesize_memberships(&approved);

        assert_eq!(memberships.len(), 2);
        assert_eq!(memberships[0].club_id, 2);
        assert_eq!(memberships[1].club_id, 5);
        assert_eq!(memberships[1].id, 1);
        assert!(memberships
            .iter()
            .all(|m| m.role == MembershipRole::Member));
    }

    #[test]
    fn test_synthesize_nothing_approved() {
        assert!(synthesize_memberships(&[]).is_empty());
    }
}
