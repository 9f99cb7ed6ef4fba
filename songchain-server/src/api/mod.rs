//! HTTP handlers for songchain-server
//!
//! - `songs`: record listing and registration (`/`, `/register_song`, `/api/songs`)
//! - `webhook`: BaaS status callbacks (`/webhook/blockchain-notification`)
//! - `verify`: transaction verification (`/verify_transaction`)
//! - `health`: liveness (`/health`)

pub mod flash;
pub mod health;
pub mod songs;
pub mod ui;
pub mod verify;
pub mod webhook;

pub use health::health_routes;
pub use songs::song_routes;
pub use verify::verify_routes;
pub use webhook::webhook_routes;
