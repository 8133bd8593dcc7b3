//! Configuration loading for the Vigil worker.
//!
//! Values come from three layers, highest precedence first: process
//! environment (optionally seeded from a `.env` file via `dotenvy`), a TOML
//! file (`vigil.toml`, `config/vigil.toml` or `VIGIL_CONFIG`), and built-in
//! defaults. [`ConfigLoader::load`] returns the composed [`Config`] together
//! with any non-fatal [`ConfigWarnings`].

#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    Config, ConfigMetadata, DatabaseConfig, MailBackend, MailConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
