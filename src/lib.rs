// Public API for integration tests and potential library usage

pub mod answer;
pub mod api;
pub mod bot;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod messenger;
pub mod protocol;
pub mod questions;
pub mod state;
pub mod types;
pub mod ws;
