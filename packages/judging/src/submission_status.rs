#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where a project submission stands in judging.
///
/// Organizers may set any value; the service itself only moves a submission
/// to `under-review` on its first review and to `scored`/`winner` on publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "submitted"))]
    Submitted,
    /// At least one judge has scored it.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "under-review"))]
    UnderReview,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "scored"))]
    Scored,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "winner"))]
    Winner,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown submission status '{0}'")]
pub struct ParseSubmissionStatusError(String);

impl SubmissionStatus {
    pub const ALL: &'static [SubmissionStatus] = &[
        Self::Draft,
        Self::Submitted,
        Self::UnderReview,
        Self::Scored,
        Self::Winner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under-review",
            Self::Scored => "scored",
            Self::Winner => "winner",
        }
    }

    /// True until the first review arrives.
    pub fn awaiting_review(&self) -> bool {
        matches!(self, Self::Draft | Self::Submitted)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = ParseSubmissionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseSubmissionStatusError(s.to_string()))
    }
}
