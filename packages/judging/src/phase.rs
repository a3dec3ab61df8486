//! Phase gate: which actions a hackathon's lifecycle status currently allows.
//!
//! The gate is a pure function of the status. It is meant to be rebuilt from
//! the freshly loaded hackathon on every request and never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hackathon_status::HackathonStatus;

/// A participant or judge action guarded by the hackathon phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    FormTeams,
    SubmitProjects,
    Judge,
    ViewResults,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Self::FormTeams,
        Self::SubmitProjects,
        Self::Judge,
        Self::ViewResults,
    ];
}

/// Permission flags derived from a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Permissions {
    pub can_form_teams: bool,
    pub can_submit_projects: bool,
    pub can_judge: bool,
    pub can_view_results: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseGate {
    status: HackathonStatus,
}

impl PhaseGate {
    pub fn new(status: HackathonStatus) -> Self {
        Self { status }
    }

    pub fn status(&self) -> HackathonStatus {
        self.status
    }

    /// Team formation stays open through `hacking` and locks at `submission`.
    pub fn can_form_teams(&self) -> bool {
        matches!(
            self.status,
            HackathonStatus::Draft
                | HackathonStatus::RegistrationOpen
                | HackathonStatus::RegistrationClosed
                | HackathonStatus::Hacking
        )
    }

    pub fn can_submit_projects(&self) -> bool {
        matches!(
            self.status,
            HackathonStatus::Hacking | HackathonStatus::Submission
        )
    }

    pub fn can_judge(&self) -> bool {
        self.status == HackathonStatus::Judging
    }

    pub fn can_view_results(&self) -> bool {
        self.status == HackathonStatus::Completed
    }

    pub fn permits(&self, action: Action) -> bool {
        match action {
            Action::FormTeams => self.can_form_teams(),
            Action::SubmitProjects => self.can_submit_projects(),
            Action::Judge => self.can_judge(),
            Action::ViewResults => self.can_view_results(),
        }
    }

    pub fn permissions(&self) -> Permissions {
        Permissions {
            can_form_teams: self.can_form_teams(),
            can_submit_projects: self.can_submit_projects(),
            can_judge: self.can_judge(),
            can_view_results: self.can_view_results(),
        }
    }

    /// Human-readable reason an action is denied, or `None` if it is allowed.
    pub fn message(&self, action: Action) -> Option<&'static str> {
        use HackathonStatus as S;

        if self.permits(action) {
            return None;
        }
        let msg = match (action, self.status) {
            (Action::FormTeams, S::Submission) => {
                "Teams are locked while submissions are being collected"
            }
            (Action::FormTeams, _) => "Team formation has closed for this hackathon",
            (Action::SubmitProjects, S::Judging | S::Completed) => {
                "The submission deadline has passed"
            }
            (Action::SubmitProjects, _) => "Project submissions are not open yet",
            (Action::Judge, S::Completed) => "Judging has ended and results are published",
            (Action::Judge, _) => "Judging has not started yet",
            (Action::ViewResults, S::Judging) => "Results are available once judging completes",
            (Action::ViewResults, _) => "Results have not been published yet",
        };
        Some(msg)
    }
}

/// Timestamps of a hackathon used for the timeline display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Schedule {
    pub registration_opens_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,
    pub hacking_starts_at: Option<DateTime<Utc>>,
    pub hacking_ends_at: Option<DateTime<Utc>>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub judging_ends_at: Option<DateTime<Utc>>,
}

impl Schedule {
    /// Check that the timestamps which are set appear in lifecycle order.
    pub fn is_ordered(&self) -> bool {
        let points = [
            self.registration_opens_at,
            self.registration_closes_at,
            self.hacking_starts_at,
            self.hacking_ends_at,
            self.submission_deadline,
            self.judging_ends_at,
        ];
        points
            .iter()
            .flatten()
            .zip(points.iter().flatten().skip(1))
            .all(|(a, b)| a <= b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Registration,
    Hacking,
    Submission,
    Judging,
    Results,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    Upcoming,
    Active,
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TimelineEntry {
    pub phase: Phase,
    pub state: PhaseState,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// The phase is still active although its scheduled end has passed.
    pub overdue: bool,
}

/// Build the phase timeline. The status decides which phase is active;
/// timestamps are only carried along for display.
pub fn timeline(
    status: HackathonStatus,
    schedule: &Schedule,
    now: DateTime<Utc>,
) -> Vec<TimelineEntry> {
    use HackathonStatus as S;

    let phases = [
        (
            Phase::Registration,
            schedule.registration_opens_at,
            schedule.registration_closes_at,
        ),
        (
            Phase::Hacking,
            schedule.hacking_starts_at,
            schedule.hacking_ends_at,
        ),
        (
            Phase::Submission,
            schedule.hacking_ends_at,
            schedule.submission_deadline,
        ),
        (
            Phase::Judging,
            schedule.submission_deadline,
            schedule.judging_ends_at,
        ),
        (Phase::Results, schedule.judging_ends_at, None),
    ];

    // Index of the active phase; `finished_before` phases before it are done.
    let (active, finished_before) = match status {
        S::Draft => (None, 0),
        S::RegistrationOpen => (Some(0), 0),
        S::RegistrationClosed => (None, 1),
        S::Hacking => (Some(1), 1),
        S::Submission => (Some(2), 2),
        S::Judging => (Some(3), 3),
        S::Completed => (Some(4), 4),
    };

    phases
        .into_iter()
        .enumerate()
        .map(|(idx, (phase, starts_at, ends_at))| {
            let state = if Some(idx) == active {
                PhaseState::Active
            } else if idx < finished_before {
                PhaseState::Finished
            } else {
                PhaseState::Upcoming
            };
            let overdue = state == PhaseState::Active && ends_at.is_some_and(|end| end < now);
            TimelineEntry {
                phase,
                state,
                starts_at,
                ends_at,
                overdue,
            }
        })
        .collect()
}
