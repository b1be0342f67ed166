//! # notesai-core
//!
//! Core types, errors, and configuration for NotesAI.
//!
//! This crate provides the data structures shared by the note store, the
//! provider layer, and the dispatch engine:
//! - [`Note`] records and the [`Operation`] set
//! - [`ProviderKind`] / [`TransportKind`] for provider classification
//! - [`ResultEnvelope`], the uniform outcome handed to dispatch callbacks
//! - [`AppConfig`], loaded from the environment

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use config::AppConfig;
pub use error::{Error, Result};
pub use models::*;
pub use uuid_utils::{new_note_id, new_v7};
