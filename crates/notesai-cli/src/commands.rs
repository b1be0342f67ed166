//! Subcommand handlers.

use anyhow::{anyhow, bail, Context};
use tokio::runtime::Handle;
use tracing::{info, warn};

use notesai_core::{AppConfig, Note, Operation, ResultEnvelope};
use notesai_inference::suggested_models;
use notesai_jobs::DispatchEngine;
use notesai_store::{NoteStore, PromptCatalog};

use crate::{Commands, PromptAction};

pub async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::New { title, content } => {
            let mut store = NoteStore::open(config.notes_path());
            let id = store.create().context("Failed to create note")?;
            if title.is_some() || content.is_some() {
                let note = store.get(&id).cloned().unwrap_or_default();
                let title = title.unwrap_or(note.title);
                let content = content.unwrap_or(note.content);
                if !store.update(&id, &title, &content) {
                    bail!("Failed to save note {}", id);
                }
            }
            println!("{}", id);
        }

        Commands::List { json } => {
            let store = NoteStore::open(config.notes_path());
            if json {
                let notes: Vec<serde_json::Value> = store
                    .list_sorted()
                    .into_iter()
                    .map(|(id, note)| note_json(id, note))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                for (id, note) in store.list_sorted() {
                    print_summary(id, note);
                }
            }
        }

        Commands::Show { id } => {
            let store = NoteStore::open(config.notes_path());
            let note = store
                .get(&id)
                .ok_or_else(|| anyhow!("Note not found: {}", id))?;
            println!("{}", serde_json::to_string_pretty(&note_json(&id, note))?);
        }

        Commands::Edit {
            id,
            title,
            content,
            category,
        } => {
            let mut store = NoteStore::open(config.notes_path());
            let note = store
                .get(&id)
                .cloned()
                .ok_or_else(|| anyhow!("Note not found: {}", id))?;
            if title.is_some() || content.is_some() {
                let title = title.unwrap_or(note.title);
                let content = content.unwrap_or(note.content);
                if !store.update(&id, &title, &content) {
                    bail!("Failed to save note {}", id);
                }
            }
            if let Some(category) = category {
                if !store.update_category(&id, &category) {
                    bail!("Failed to save category for {}", id);
                }
            }
        }

        Commands::Delete { id } => {
            let mut store = NoteStore::open(config.notes_path());
            if !store.delete(&id) {
                bail!("Note not found: {}", id);
            }
        }

        Commands::Search { query } => {
            let store = NoteStore::open(config.notes_path());
            for (id, note) in store.search(&query) {
                print_summary(id, note);
            }
        }

        Commands::Process {
            id,
            operation,
            provider,
            model,
            apply,
        } => {
            let mut store = NoteStore::open(config.notes_path());
            let content = store
                .get(&id)
                .map(|n| n.content.clone())
                .ok_or_else(|| anyhow!("Note not found: {}", id))?;

            let engine = engine(config)?;
            if let Some(provider) = provider {
                engine.set_provider(&provider)?;
            }
            if let Some(slug) = model {
                engine.set_model_slug(&slug)?;
            }
            let envelope = engine.process_and_wait(&content, &operation).await;
            println!("{}", serde_json::to_string_pretty(&envelope.to_json())?);

            match envelope {
                ResultEnvelope::Success { operation, result } if apply => {
                    apply_result(&mut store, &id, operation, &result)?;
                }
                ResultEnvelope::Success { .. } => {}
                ResultEnvelope::Failure { kind, error } => {
                    warn!(note_id = %id, ?kind, "AI operation failed");
                    bail!("{}", error);
                }
            }
        }

        Commands::Model => {
            let engine = engine(config)?;
            let (provider, model) = engine.active_model()?;
            let key = if engine.has_credential(&provider)? {
                "key set"
            } else {
                "no key"
            };
            println!("{} ({}, {})", model, provider, key);
        }

        Commands::Models => {
            for (provider, model) in suggested_models() {
                println!("{}:{}", provider, model);
            }
        }

        Commands::SetKey { provider, api_key } => {
            let engine = engine(config)?;
            engine.set_credential(&provider, &api_key)?;
            println!("Stored API key for {}", provider);
        }

        Commands::Prompts { action } => {
            let engine = engine(config)?;
            match action.unwrap_or(PromptAction::Show) {
                PromptAction::Show => {
                    println!("{}", serde_json::to_string_pretty(&engine.prompts()?)?);
                }
                PromptAction::Set {
                    operation,
                    template,
                } => {
                    let op: Operation = operation.parse()?;
                    let mut templates = engine.prompts()?;
                    templates.insert(op.as_str().to_string(), template);
                    engine.save_prompts(templates)?;
                    info!(ai_op = %op, "Prompt template updated");
                }
                PromptAction::Reset => {
                    engine.save_prompts(PromptCatalog::defaults())?;
                    info!("Prompt templates reset to defaults");
                }
            }
        }
    }
    Ok(())
}

fn engine(config: &AppConfig) -> anyhow::Result<DispatchEngine> {
    DispatchEngine::from_config(config, Handle::current())
        .context("Failed to initialize dispatch engine")
}

/// Write an AI result back into the note it came from.
///
/// Correction replaces the content and categorization sets the category.
/// A summary is only displayed.
fn apply_result(
    store: &mut NoteStore,
    id: &str,
    operation: Operation,
    result: &str,
) -> anyhow::Result<()> {
    let saved = match operation {
        Operation::Correction => {
            let title = store.get(id).map(|n| n.title.clone()).unwrap_or_default();
            store.update(id, &title, result)
        }
        Operation::Categorization => store.update_category(id, result),
        Operation::Summary => true,
    };
    if !saved {
        bail!("Failed to apply {} result to {}", operation, id);
    }
    Ok(())
}

fn note_json(id: &str, note: &Note) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": note.title,
        "content": note.content,
        "category": note.category,
        "created": note.created.to_rfc3339(),
        "modified": note.modified.to_rfc3339(),
    })
}

fn print_summary(id: &str, note: &Note) {
    println!(
        "{}  {}  [{}]  {}",
        id,
        note.modified.format("%Y-%m-%d %H:%M"),
        note.category,
        note.title
    );
}
