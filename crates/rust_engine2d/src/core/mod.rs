//! Core engine configuration
//!
//! Game settings are loaded once at startup and are read-only for the
//! lifetime of a [`World`](crate::World).

pub mod config;

pub use config::{DeveloperSettings, GameSettings, ValueNotFoundPolicy};
