// Garuda - SIMRS to SatuSehat FHIR Publishing Worker
// Copyright (c) 2025 Garuda Contributors
// Licensed under the MIT License

//! # Garuda - SIMRS to SatuSehat FHIR Publishing Worker
//!
//! Garuda is a scheduled integration worker that extracts clinical visit
//! data from a hospital information system (SIMRS), maps it into FHIR R4
//! transaction bundles and publishes completed bundles to the SatuSehat
//! national health exchange.
//!
//! ## Overview
//!
//! Each discovered visit moves through a persisted lifecycle:
//!
//! 1. **Fetch** - closed visits in a trailing window are discovered and
//!    stored once, with immutable visit-detail and vital-sign snapshots.
//!    Snapshots that fail required-field validation park the record as
//!    `INVALID`, terminally.
//! 2. **Fill** - six clinical sections (diagnosis, lab, radiology,
//!    medication request, medication dispense, procedure) are fetched
//!    independently and idempotently; only missing/invalid sections are
//!    re-fetched on later sweeps.
//! 3. **Mark-complete** - a record becomes `READY` when every enabled
//!    section is present, or when the visit exceeds the mark-complete
//!    age threshold.
//! 4. **Publish** - ready records are assembled into one transaction
//!    bundle per visit and posted to the registry (or written to a
//!    simulation directory), with the outcome recorded per visit.
//!
//! The four sweeps never call each other; they are coupled only through
//! the embedded store, which makes each one independently schedulable,
//! crash-safe and re-entrant.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (assembler, sweep jobs, scheduler)
//! - [`mapper`] - Pure clinical-record-to-FHIR-resource mappers
//! - [`fhir`] - Minimal FHIR R4 wire model
//! - [`adapters`] - External integrations (SIMRS, store, registry)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use garuda::cli::commands::start::StartArgs;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let args = StartArgs {};
//!     let exit_code = args.execute("garuda.toml", shutdown_rx).await?;
//!     std::process::exit(exit_code);
//! }
//! ```
//!
//! ## Error Handling
//!
//! Garuda uses the [`domain::GarudaError`] hierarchy. Per-visit failures
//! are logged and swallowed at sweep boundaries; only startup failures
//! abort the process:
//!
//! ```rust,no_run
//! use garuda::domain::{GarudaError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = garuda::config::load_config("garuda.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Garuda uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("starting publish sweep");
//! warn!(visit_id = "V-001", "section still missing");
//! error!(error = "timeout", "registry call failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod fhir;
pub mod logging;
pub mod mapper;
