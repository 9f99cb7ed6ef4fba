//! # songchain Common Library
//!
//! Shared code for the songchain server and its tests:
//! - Song record model and BaaS payload types
//! - Webhook notification types and signature checking
//! - Configuration loading (CLI > env > TOML > defaults)
//! - Error types
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod models;
pub mod time;
pub mod webhook;

pub use error::{Error, Result};
pub use models::{SongPayload, SongRecord, SongStatus};
