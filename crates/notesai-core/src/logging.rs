//! Structured logging field name constants for NotesAI.
//!
//! All crates use these constants for consistent structured logging fields,
//! so JSON log output can be filtered by the same keys across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Data could not be persisted, requires user attention |
//! | WARN  | Recoverable issue, fallback applied (corrupt file, failed request) |
//! | INFO  | Lifecycle events, completed operations |
//! | DEBUG | Decision points, resolved provider/model, request sizes |
//! | TRACE | Per-note iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "store", "inference", "jobs", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "notes", "prompts", "ollama", "openai", "anthropic", "dispatch"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "generate", "process", "save"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note id being operated on.
pub const NOTE_ID: &str = "note_id";

/// Canned AI operation (correction, resume, categorie).
pub const AI_OPERATION: &str = "ai_op";

/// Provider name.
pub const PROVIDER: &str = "provider";

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Path of a persisted document.
pub const PATH: &str = "path";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of notes returned by a listing or search.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// HTTP status returned by a provider.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
