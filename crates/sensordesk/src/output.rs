//! Output formatting: table, JSON, YAML, plain; plus the terminal notifier.
//!
//! Renders items in the format selected by `--output`. Records are
//! schemaless, so table columns are the scalar fields seen across the
//! rendered items, in first-seen order.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{builder::Builder, settings::Style};

use sensordesk_core::{Item, NotificationKind, Notifier};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a collection in the chosen format.
pub fn render_list(format: OutputFormat, items: &[Item]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table(items)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(items)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(items)?),
        OutputFormat::Plain => Ok(items.iter().map(id_of).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single record. Table mode prints one `field: value` per line.
pub fn render_single(format: OutputFormat, item: &Item) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(detail(item)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(item)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(item)?),
        OutputFormat::Plain => Ok(id_of(item)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table(items: &[Item]) -> String {
    let columns = columns(items);
    let mut builder = Builder::default();
    builder.push_record(columns.clone());
    for item in items {
        builder.push_record(columns.iter().map(|c| cell(item.get(c))));
    }
    builder.build().with(Style::rounded()).to_string()
}

fn columns(items: &[Item]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        for (field, value) in item.fields() {
            if is_scalar(value) && !columns.iter().any(|c| c == field) {
                columns.push(field.clone());
            }
        }
    }
    columns
}

fn detail(item: &Item) -> String {
    let width = item.fields().map(|(f, _)| f.len()).max().unwrap_or(0);
    item.fields()
        .map(|(field, value)| {
            let label = format!("{field}:");
            format!("{label:<pad$}  {}", cell(Some(value)), pad = width + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".into(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn id_of(item: &Item) -> String {
    item.id().map(|id| id.to_string()).unwrap_or_default()
}

// ── Terminal notifier ────────────────────────────────────────────────

/// Prints form notifications to stderr. Quiet mode drops successes.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    pub color: bool,
    pub quiet: bool,
}

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        let mut stderr = io::stderr().lock();
        match (kind, self.color) {
            (NotificationKind::Success, _) if self.quiet => {}
            (NotificationKind::Success, true) => {
                let _ = writeln!(stderr, "{} {message}", "✓".green());
            }
            (NotificationKind::Success, false) => {
                let _ = writeln!(stderr, "✓ {message}");
            }
            (NotificationKind::Error, true) => {
                let _ = writeln!(stderr, "{} {message}", "✗".red());
            }
            (NotificationKind::Error, false) => {
                let _ = writeln!(stderr, "✗ {message}");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items() -> Vec<Item> {
        vec![
            Item::try_from(json!({ "id": 1, "name": "Barn", "_links": { "self": {} } })).unwrap(),
            Item::try_from(json!({ "id": "2", "serial": "X-9", "name": null })).unwrap(),
        ]
    }

    #[test]
    fn table_columns_are_scalar_union_in_order() {
        assert_eq!(columns(&items()), vec!["id", "name", "serial"]);
    }

    #[test]
    fn table_fills_missing_cells() {
        let table = render_list(OutputFormat::Table, &items()).unwrap();
        assert!(table.contains("Barn"));
        assert!(table.contains("X-9"));
        assert!(!table.contains("_links"));
        assert!(table.contains('-'));
    }

    #[test]
    fn plain_lists_ids() {
        assert_eq!(render_list(OutputFormat::Plain, &items()).unwrap(), "1\n2");
    }

    #[test]
    fn json_keeps_server_field_order() {
        let out = render_single(OutputFormat::JsonCompact, &items()[1]).unwrap();
        assert_eq!(out, r#"{"id":"2","serial":"X-9","name":null}"#);
    }

    #[test]
    fn detail_aligns_fields() {
        let item = Item::empty().with("id", 7).with("location", "north");
        assert_eq!(detail(&item), "id:        7\nlocation:  north");
    }
}
