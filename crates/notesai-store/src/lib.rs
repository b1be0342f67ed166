//! # notesai-store
//!
//! JSON document storage for NotesAI.
//!
//! This crate provides:
//! - [`NoteStore`]: the note collection in `notes.json`
//! - [`PromptCatalog`]: per-operation prompt templates in `prompts.json`
//! - [`CredentialStore`]: provider API keys in `config.json`
//!
//! Every document is rewritten whole on each mutation through a
//! temp-file-then-rename so a crash mid-write never leaves a truncated file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use notesai_store::NoteStore;
//!
//! let mut store = NoteStore::open("/tmp/notesai/notes.json");
//! let id = store.create().expect("notes.json is writable");
//! store.update(&id, "Groceries", "milk, eggs");
//! for (id, note) in store.search("milk") {
//!     println!("{id}: {}", note.title);
//! }
//! ```

pub mod credentials;
pub mod file_storage;
pub mod notes;
pub mod prompts;

pub use credentials::CredentialStore;
pub use notes::NoteStore;
pub use prompts::{PromptCatalog, PromptTemplates};
