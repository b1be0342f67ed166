//! Per-operation prompt templates persisted in `prompts.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use notesai_core::defaults::PROMPT_PLACEHOLDER;
use notesai_core::{Error, Operation, Result};

use crate::file_storage::{read_json, write_json_atomic};

/// Operation name → template text.
pub type PromptTemplates = BTreeMap<String, String>;

const CORRECTION_PROMPT: &str = "Correct the grammar, spelling, and syntax errors in this text \
without changing its meaning, and append the original version of the text at the bottom: {content}";

const SUMMARY_PROMPT: &str = "Summarize this text, keeping the essential points, and append the \
original version at the bottom: {content}";

const CATEGORIZATION_PROMPT: &str = "Analyze this text and assign it one category among the \
following: 'Work', 'Personal', 'Idea', 'Project', 'Health', 'Finance', 'History', 'Computing'. \
Reply with the category word only: {content}";

/// Prompt catalog with built-in fallbacks.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    path: PathBuf,
    templates: PromptTemplates,
}

impl PromptCatalog {
    /// The built-in template set, one entry per [`Operation`].
    pub fn defaults() -> PromptTemplates {
        Operation::ALL
            .iter()
            .map(|op| {
                let template = match op {
                    Operation::Correction => CORRECTION_PROMPT,
                    Operation::Summary => SUMMARY_PROMPT,
                    Operation::Categorization => CATEGORIZATION_PROMPT,
                };
                (op.as_str().to_string(), template.to_string())
            })
            .collect()
    }

    /// Load templates from `path`.
    ///
    /// A missing document is created with the defaults. Operations missing
    /// from an existing document fall back to their defaults; extra keys are
    /// kept. A corrupt document is logged and the defaults are used without
    /// touching the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let templates = match read_json::<PromptTemplates>(&path) {
            Ok(Some(stored)) => {
                let mut templates = Self::defaults();
                templates.extend(stored);
                templates
            }
            Ok(None) => {
                let templates = Self::defaults();
                write_json_atomic(&path, &templates)?;
                info!(path = %path.display(), "Wrote default prompt templates");
                templates
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load prompts, using defaults");
                Self::defaults()
            }
        };
        Ok(Self { path, templates })
    }

    /// A catalog holding `templates` without any backing file interaction.
    pub fn from_templates(path: impl AsRef<Path>, templates: PromptTemplates) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            templates,
        }
    }

    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    /// The template registered for `operation`.
    pub fn resolve(&self, operation: &str) -> Result<&str> {
        self.templates
            .get(operation)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownOperation(operation.to_string()))
    }

    /// The template for `operation` with its placeholder replaced by `content`.
    pub fn render(&self, operation: &str, content: &str) -> Result<String> {
        let template = self.resolve(operation)?;
        Ok(render_template(template, content))
    }

    /// Replace the whole template set and persist it.
    pub fn save(&mut self, templates: PromptTemplates) -> Result<()> {
        write_json_atomic(&self.path, &templates)?;
        debug!(path = %self.path.display(), count = templates.len(), "Saved prompt templates");
        self.templates = templates;
        Ok(())
    }
}

/// Replace the first placeholder occurrence in `template` with `content`.
///
/// Inserted content is not scanned again, so placeholder text inside the
/// content survives verbatim.
pub fn render_template(template: &str, content: &str) -> String {
    if !template.contains(PROMPT_PLACEHOLDER) {
        warn!("Prompt template has no {} placeholder", PROMPT_PLACEHOLDER);
    }
    template.replacen(PROMPT_PLACEHOLDER, content, 1)
}
