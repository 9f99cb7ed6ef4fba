//! Outbound service clients

pub mod baas_client;

pub use baas_client::{BaasClient, BaasError, VerifyOutcome};
