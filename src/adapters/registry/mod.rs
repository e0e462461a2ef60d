//! SatuSehat registry client
//!
//! HTTP client for the national health exchange: OAuth2
//! client-credentials token management, bundle submission and
//! patient/practitioner id lookup.

pub mod client;

pub use client::{RegistryClient, TokenDetail};
