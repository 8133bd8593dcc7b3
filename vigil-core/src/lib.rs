//! # Vigil Core
//!
//! Core library for Vigil, the scheduled worker that keeps in touch with
//! volunteers who have gone quiet.
//!
//! ## Overview
//!
//! - **Inactivity notices**: 30/60/90 day tiers, blackout handling and
//!   per-volunteer failure reporting ([`domain::inactivity`])
//! - **Persistence ports**: trait-based volunteer and availability
//!   repositories with PostgreSQL adapters ([`database`])
//! - **Mail transports**: SendGrid dynamic templates and a logging backend
//!   ([`infrastructure::mail`])
//!
//! ## Feature Flags
//!
//! - `database`: Enables the PostgreSQL/SQLx adapters and [`MIGRATOR`]
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vigil_core::{
//!     database::{PostgresAvailabilityRepository, PostgresVolunteerRepository},
//!     domain::inactivity::InactivityNotifier,
//!     infrastructure::mail::LogMailer,
//! };
//!
//! async fn notify(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let notifier = InactivityNotifier::new(
//!         Arc::new(PostgresVolunteerRepository::new(pool.clone())),
//!         Arc::new(PostgresAvailabilityRepository::new(pool)),
//!         Arc::new(LogMailer),
//!     );
//!     let report = notifier.run_from_start_date("2024-03-15").await?;
//!     println!("sent {} notices", report.sent().total());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Persistence ports and PostgreSQL adapters
pub mod database;

/// Domain types and services
pub mod domain;

/// Error types and error handling utilities
pub mod error;

/// Adapters for external services (mail delivery)
pub mod infrastructure;

/// Mail transport port
pub mod mail;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{Result, VigilError};
