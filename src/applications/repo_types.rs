use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle stage of an application. Any stage may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "application_status", rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    #[default]
    Saved,
    Applied,
    Oa,
    Phone,
    Onsite,
    Offer,
    Rejected,
    Ghosted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 8] = [
        ApplicationStatus::Saved,
        ApplicationStatus::Applied,
        ApplicationStatus::Oa,
        ApplicationStatus::Phone,
        ApplicationStatus::Onsite,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Ghosted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "SAVED",
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Oa => "OA",
            ApplicationStatus::Phone => "PHONE",
            ApplicationStatus::Onsite => "ONSITE",
            ApplicationStatus::Offer => "OFFER",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Ghosted => "GHOSTED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status `{}`", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    /// Exact, upper-case match on the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Job application record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub role_title: String,
    pub location: Option<String>,
    pub status: ApplicationStatus,
    pub url: Option<String>,
    pub salary_range: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated, normalized fields for a new record. Optionals are never `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub company: String,
    pub role_title: String,
    pub location: Option<String>,
    pub status: ApplicationStatus,
    pub url: Option<String>,
    pub salary_range: Option<String>,
    pub notes: Option<String>,
}

/// Partial update.
///
/// Outer `None` leaves the column untouched; `Some(None)` clears a nullable
/// column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub role_title: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub location: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub salary_range: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl JobApplication {
    /// Applies a patch in memory, mirroring the SQL update.
    pub fn apply(&mut self, patch: ApplicationPatch, now: OffsetDateTime) {
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(role_title) = patch.role_title {
            self.role_title = role_title;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(salary_range) = patch.salary_range {
            self.salary_range = salary_range;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.updated_at = now;
    }
}
