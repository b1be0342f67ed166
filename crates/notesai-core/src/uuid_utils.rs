//! UUIDv7 helpers for time-ordered note identifiers.
//!
//! UUIDv7 embeds a millisecond Unix timestamp in its first 48 bits, so note
//! ids stay time-ordered while remaining unique for notes created within
//! the same second.

use uuid::Uuid;

use crate::defaults::NOTE_ID_PREFIX;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a note id of the form `note_<32 hex digits>`.
///
/// Ids generated later compare lexicographically greater.
///
/// ```
/// use notesai_core::new_note_id;
///
/// let id = new_note_id();
/// assert!(id.starts_with("note_"));
/// ```
pub fn new_note_id() -> String {
    format!("{}{}", NOTE_ID_PREFIX, new_v7().simple())
}
