pub mod criteria;
pub mod hackathon;
pub mod judge;
pub mod review;
pub mod submission;
pub mod team;
