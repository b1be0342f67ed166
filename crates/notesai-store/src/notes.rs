//! Note collection persisted as a single `notes.json` document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use notesai_core::{new_note_id, Note, Result};

use crate::file_storage::{read_json, write_json_atomic};

/// In-memory note mapping backed by `notes.json`.
///
/// Every mutation rewrites the whole document. Mutations are applied to a
/// copy first and only committed once the write succeeds, so a failed write
/// leaves both the file and the in-memory state untouched.
pub struct NoteStore {
    path: PathBuf,
    notes: BTreeMap<String, Note>,
    current: Option<String>,
}

impl NoteStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and also yields an empty store; the file is left as-is until
    /// the next successful mutation.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let notes = match read_json::<BTreeMap<String, Note>>(&path) {
            Ok(Some(notes)) => notes,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load notes, starting empty");
                BTreeMap::new()
            }
        };
        info!(path = %path.display(), result_count = notes.len(), "Loaded notes");
        Self {
            path,
            notes,
            current: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Create a note with default title and category and select it.
    #[instrument(skip(self), fields(subsystem = "store", component = "notes", op = "create"))]
    pub fn create(&mut self) -> Result<String> {
        let id = new_note_id();
        let note = Note::new();
        self.commit(|notes| {
            notes.insert(id.clone(), note);
            Some(())
        })?;
        self.current = Some(id.clone());
        info!(note_id = %id, "Created note");
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Overwrite title and content.
    ///
    /// Returns `false` when the id is unknown or the document could not be
    /// written.
    pub fn update(&mut self, id: &str, title: &str, content: &str) -> bool {
        let updated = self.commit_logged("update", |notes| {
            let note = notes.get_mut(id)?;
            note.title = title.to_string();
            note.content = content.to_string();
            note.touch();
            Some(())
        });
        debug!(note_id = %id, success = updated, "Updated note");
        updated
    }

    /// Overwrite the category, e.g. with the output of a categorization.
    pub fn update_category(&mut self, id: &str, category: &str) -> bool {
        let updated = self.commit_logged("update_category", |notes| {
            let note = notes.get_mut(id)?;
            note.category = category.to_string();
            note.touch();
            Some(())
        });
        debug!(note_id = %id, category, success = updated, "Updated note category");
        updated
    }

    /// Remove a note. Unknown ids leave the store unchanged.
    pub fn delete(&mut self, id: &str) -> bool {
        let deleted = self.commit_logged("delete", |notes| notes.remove(id).map(|_| ()));
        if deleted && self.current.as_deref() == Some(id) {
            self.current = None;
        }
        debug!(note_id = %id, success = deleted, "Deleted note");
        deleted
    }

    /// The full id → note mapping.
    pub fn list_all(&self) -> &BTreeMap<String, Note> {
        &self.notes
    }

    /// All notes, most recently modified first.
    pub fn list_sorted(&self) -> Vec<(&str, &Note)> {
        let mut notes: Vec<(&str, &Note)> =
            self.notes.iter().map(|(id, n)| (id.as_str(), n)).collect();
        sort_by_modified_desc(&mut notes);
        notes
    }

    /// Notes whose title, content, or category contains `text`
    /// (case-insensitive), most recently modified first.
    pub fn search(&self, text: &str) -> Vec<(&str, &Note)> {
        let needle = text.to_lowercase();
        let mut hits: Vec<(&str, &Note)> = self
            .notes
            .iter()
            .filter(|(_, note)| note.matches(&needle))
            .map(|(id, n)| (id.as_str(), n))
            .collect();
        sort_by_modified_desc(&mut hits);
        debug!(query = text, result_count = hits.len(), "Searched notes");
        hits
    }

    /// Id of the note the user is working on, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Make `id` the current note. Returns `false` for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        if self.notes.contains_key(id) {
            self.current = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Apply `mutate` to a copy of the mapping, persist it, then commit.
    ///
    /// `Ok(None)` means `mutate` declined (unknown id); nothing is written.
    fn commit<T, F>(&mut self, mutate: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut BTreeMap<String, Note>) -> Option<T>,
    {
        let mut next = self.notes.clone();
        let Some(out) = mutate(&mut next) else {
            return Ok(None);
        };
        write_json_atomic(&self.path, &next)?;
        self.notes = next;
        Ok(Some(out))
    }

    fn commit_logged<F>(&mut self, op: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut BTreeMap<String, Note>) -> Option<()>,
    {
        match self.commit(mutate) {
            Ok(outcome) => outcome.is_some(),
            Err(e) => {
                error!(op, path = %self.path.display(), error = %e, "Failed to save notes");
                false
            }
        }
    }
}

fn sort_by_modified_desc(notes: &mut [(&str, &Note)]) {
    notes.sort_by(|a, b| b.1.modified.cmp(&a.1.modified).then_with(|| b.0.cmp(a.0)));
}
