//! Shared helpers for command handlers.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use sensordesk_core::{ConfirmationGate, Item, ResourceKind};

use crate::cli::FieldArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON object file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Item, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })?;
    Item::try_from(value).map_err(|_| CliError::Validation {
        field: "from-file".into(),
        reason: "expected a JSON object".into(),
    })
}

/// Build the working item from `--from-file` then `--set` pairs.
pub fn fields_to_item(args: &FieldArgs, base: Item) -> Result<Item, CliError> {
    let mut item = base;
    if let Some(ref path) = args.from_file {
        for (field, value) in read_json_file(path)?.into_object() {
            item.set(field, value);
        }
    }
    for pair in &args.set {
        let (field, value) = parse_assignment(pair)?;
        item.set(field, value);
    }
    Ok(item)
}

/// `field=value`; the value is JSON when it parses, text otherwise.
fn parse_assignment(pair: &str) -> Result<(String, Value), CliError> {
    let Some((field, raw)) = pair.split_once('=') else {
        return Err(CliError::Validation {
            field: "set".into(),
            reason: format!("expected FIELD=VALUE, got '{pair}'"),
        });
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(CliError::Validation {
            field: "set".into(),
            reason: format!("missing field name in '{pair}'"),
        });
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((field.to_owned(), value))
}

// ── Confirmation gate ───────────────────────────────────────────────

/// Asks on the terminal before a delete goes out.
#[derive(Debug, Clone, Copy)]
pub struct PromptGate {
    pub kind: ResourceKind,
}

#[async_trait]
impl ConfirmationGate for PromptGate {
    async fn confirm(&self, item: &Item) -> bool {
        let prompt = format!("Delete {} {}?", self.kind.label().to_lowercase(), describe(item));
        match tokio::task::spawn_blocking(move || confirm(&prompt, false)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                warn!(error = %e, "confirmation prompt failed, not deleting");
                false
            }
            Err(e) => {
                warn!(error = %e, "confirmation prompt panicked, not deleting");
                false
            }
        }
    }
}

/// `'Barn' (3)`, or just the id when the record has no name.
fn describe(item: &Item) -> String {
    let id = item.id().map(|id| id.to_string()).unwrap_or_else(|| "?".into());
    match item.get_str("name").or_else(|| item.get_str("username")) {
        Some(name) => format!("'{name}' ({id})"),
        None => id,
    }
}
