pub mod hackathon;
pub mod jwt;
pub mod submission;
