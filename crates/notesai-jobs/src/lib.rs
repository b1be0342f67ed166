//! # notesai-jobs
//!
//! Background AI dispatch for NotesAI.
//!
//! This crate provides:
//! - [`DispatchEngine`]: runs correction, summary and categorization
//!   requests off the caller's thread, bounded by a semaphore
//! - Exactly-once result delivery through a caller-supplied callback
//! - Submission-time snapshots of provider, model, credential and prompts
//!
//! ## Example
//!
//! ```ignore
//! use notesai_core::AppConfig;
//! use notesai_jobs::DispatchEngine;
//!
//! let config = AppConfig::from_env();
//! let engine = DispatchEngine::from_config(&config, tokio::runtime::Handle::current())?;
//!
//! engine.process("helo wrld", "correction", |envelope| {
//!     println!("{}", envelope.to_json());
//! });
//!
//! // Or await the result directly
//! let envelope = engine.process_and_wait("Meeting at 10am", "categorie").await;
//! ```

pub mod dispatch;

// Re-export core types
pub use notesai_core::*;

pub use dispatch::{BackendResolver, DispatchConfig, DispatchEngine, EngineState};
