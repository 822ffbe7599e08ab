// Data models for keypoints, exercises, workout plans and session updates

pub mod exercise;
pub mod pose;
pub mod session;
pub mod workout;
