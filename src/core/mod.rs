pub mod config;
pub mod geometry;
pub mod recipes;

// Rep tracking pipeline
pub mod pose_classifier;
pub mod rep_counter;
pub mod calibration;

// Session orchestration
pub mod workout_presets;
pub mod session_manager;
pub mod tracker_service;

pub mod synthetic;
