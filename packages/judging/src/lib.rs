pub mod criteria;
pub mod error;
pub mod hackathon_status;
pub mod leaderboard;
pub mod phase;
pub mod review;
pub mod scoring;
pub mod submission_status;

pub use error::{CriteriaError, ReviewError, ScoringError};
pub use hackathon_status::HackathonStatus;
pub use phase::{Action, PhaseGate};
pub use submission_status::SubmissionStatus;
