pub mod hackathon;
pub mod hackathon_judge;
pub mod judging_criterion;
pub mod review;
pub mod review_score;
pub mod submission;
pub mod team;
pub mod team_member;
