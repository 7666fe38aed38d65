//! Terminal dashboard for the GenAI CCTV stack: polls the latest incident
//! caption, derives what to show, and lets the operator pick the captioning
//! prompt.

pub mod app;
pub mod auth;
pub mod commands;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod poller;
pub mod prompts;
pub mod record;
pub mod render;
pub mod view;

pub use errors::{Error, Result};
