#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status of a hackathon.
///
/// Organizers move a hackathon through these states; the order below is the
/// intended order but nothing at this layer forces forward-only transitions.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "kebab-case")]
pub enum HackathonStatus {
    /// Being set up by the organizer, not visible to participants.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "registration-open"))]
    RegistrationOpen,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "registration-closed"))]
    RegistrationClosed,
    /// Teams are building their projects.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "hacking"))]
    Hacking,
    /// Submission window; teams are locked.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "submission"))]
    Submission,
    /// Judges are scoring submissions.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "judging"))]
    Judging,
    /// Results are published.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "completed"))]
    Completed,
}

impl HackathonStatus {
    /// All possible status values, in lifecycle order.
    pub const ALL: &'static [HackathonStatus] = &[
        Self::Draft,
        Self::RegistrationOpen,
        Self::RegistrationClosed,
        Self::Hacking,
        Self::Submission,
        Self::Judging,
        Self::Completed,
    ];

    /// Returns the string representation (kebab-case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::RegistrationOpen => "registration-open",
            Self::RegistrationClosed => "registration-closed",
            Self::Hacking => "hacking",
            Self::Submission => "submission",
            Self::Judging => "judging",
            Self::Completed => "completed",
        }
    }

    /// Returns true once judging has started (criteria are frozen from here on).
    pub fn judging_started(&self) -> bool {
        matches!(self, Self::Judging | Self::Completed)
    }
}

impl fmt::Display for HackathonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for HackathonStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid hackathon status '{0}'. Valid values: {valid}", valid = valid_statuses())]
pub struct ParseHackathonStatusError(String);

fn valid_statuses() -> String {
    HackathonStatus::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for HackathonStatus {
    type Err = ParseHackathonStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HackathonStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseHackathonStatusError(s.to_string()))
    }
}
