//! Adapters for services outside the database.

pub mod mail;
