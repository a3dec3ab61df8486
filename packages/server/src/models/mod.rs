pub mod criteria;
pub mod hackathon;
pub mod judge;
pub mod results;
pub mod review;
pub mod shared;
pub mod submission;
pub mod team;
