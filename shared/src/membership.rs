use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::Club;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum MembershipRole {
    Member,
    Officer,
    President,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum MembershipStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ClubMembership {
    pub id: i64,
    pub club_id: i64,
    pub user_id: i64,
    pub role: MembershipRole,
    pub joined_at: NaiveDateTime,
    pub status: MembershipStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ClubMembershipApplication {
    pub id: i64,
    pub club_id: i64,
    pub applicant_id: i64,
    pub motivation: String,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub availability: Option<String>,
    pub expectations: Option<String>,
    pub status: ApplicationStatus,
    pub application_date: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
}

impl ClubMembershipApplication {
    /// The membership an approved application stands in for when the club
    /// has no explicit membership row for the applicant.
    pub fn as_membership(&self) -> ClubMembership {
        ClubMembership {
            id: self.id,
            club_id: self.club_id,
            user_id: self.applicant_id,
            role: MembershipRole::Member,
            joined_at: self.application_date,
            status: MembershipStatus::Active,
        }
    }
}

/// Where a row in the membership view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipSource {
    Membership,
    Application,
}

/// A membership joined with its club, as returned by the reconciled read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubMembershipView {
    pub membership: ClubMembership,
    pub source: MembershipSource,
    pub club: Club,
}
