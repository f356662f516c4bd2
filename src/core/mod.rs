//! Core application logic

pub mod app;
pub mod dashboard;
pub mod events;
pub mod state;
