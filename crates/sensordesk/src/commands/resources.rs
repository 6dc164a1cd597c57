//! Resource command handlers (devices, sensors, actuators, rules, users, models).
//!
//! Every mutation goes through the core's form controllers, so the CLI
//! gets the same validation mapping, notifications and confirmation
//! flow as any other front end.

use std::io::IsTerminal;
use std::sync::Arc;

use sensordesk_core::{
    Console, EntityId, FormController, Item, Outcome, ResourceKind, Settled, Submission,
};

use crate::cli::{FieldArgs, GlobalOpts, OutputFormat, ResourceCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// What a handler needs besides the console.
pub struct Ctx<'a> {
    pub global: &'a GlobalOpts,
    pub format: OutputFormat,
}

pub async fn handle(
    kind: ResourceKind,
    command: ResourceCommand,
    console: &Console,
    ctx: &Ctx<'_>,
) -> Result<(), CliError> {
    match command {
        ResourceCommand::List => {
            let binding = console.open(kind).await?;
            let out = output::render_list(ctx.format, &binding.list().snapshot())?;
            output::print_output(&out, ctx.global.quiet);
            Ok(())
        }

        ResourceCommand::Create(fields) => {
            let binding = console.bind(kind, Vec::new());
            let item = util::fields_to_item(&fields, Item::empty())?;
            let result = submit(binding.create(), item).await?;
            print_item(&result, ctx)
        }

        ResourceCommand::Update { id, fields } => update(kind, &id, &fields, console, ctx).await,

        ResourceCommand::Delete { id } => delete(kind, &id, console, ctx).await,

        ResourceCommand::Key { id } => {
            let binding = console.bind(kind, Vec::new());
            let Some(form) = binding.key() else {
                return Err(CliError::Unsupported {
                    operation: "key".into(),
                    resource: kind.path().into(),
                });
            };
            let result = submit(form, id_item(&id)).await?;
            print_item(&result, ctx)
        }
    }
}

// ── Update / Delete ─────────────────────────────────────────────────

/// Fetch the current record, overlay the given fields, PUT it back.
async fn update(
    kind: ResourceKind,
    id: &str,
    fields: &FieldArgs,
    console: &Console,
    ctx: &Ctx<'_>,
) -> Result<(), CliError> {
    let current = fetch(kind, id, console).await?;
    let binding = console.bind(kind, vec![current.clone()]);
    let item = util::fields_to_item(fields, current)?;
    let result = submit(binding.update(), item).await?;
    print_item(&result, ctx)
}

async fn delete(
    kind: ResourceKind,
    id: &str,
    console: &Console,
    ctx: &Ctx<'_>,
) -> Result<(), CliError> {
    let gated = console.config().confirm_deletes && !ctx.global.yes;
    if gated && !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: format!("{} delete", kind.path()),
        });
    }

    let current = fetch(kind, id, console).await?;
    let binding = console.bind(kind, vec![current.clone()]);
    let delete = binding.delete();
    delete.form().set_item(current);

    match delete.delete_item().await {
        Submission::Declined => {
            eprintln!("Aborted.");
            Ok(())
        }
        Submission::Settled(Settled::Succeeded { .. }) => Ok(()),
        other => settled_err(delete.form(), other),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Load one record by id, mapping a 404 to a friendly error.
async fn fetch(kind: ResourceKind, id: &str, console: &Console) -> Result<Item, CliError> {
    let path = format!("{}/{}", kind.path(), id_of(id).as_path_segment());
    match console.gateway().get(&path).await {
        Outcome::Success(item) if item.id().is_some() => Ok(item),
        Outcome::Success(item) => Ok(item.with("id", id_of(id).to_value())),
        Outcome::Failure(failure) if failure.status == Some(404) => Err(CliError::NotFound {
            resource_type: kind.label().to_lowercase(),
            identifier: id.into(),
            list_command: format!("{} list", kind.path()),
        }),
        Outcome::Failure(failure) => {
            let action = format!("Fetch {}", kind.label().to_lowercase());
            Err(CliError::from_failure(&action, &failure))
        }
    }
}

/// Submit `item` through `form`, returning the (post-processed) result.
async fn submit(form: &Arc<FormController>, item: Item) -> Result<Item, CliError> {
    form.set_item(item);
    match form.submit().await {
        Submission::Settled(Settled::Succeeded { result, .. }) => Ok(result),
        other => settled_err(form, other),
    }
}

fn settled_err<T>(form: &FormController, submission: Submission) -> Result<T, CliError> {
    match submission {
        Submission::Settled(Settled::Failed { failure, .. }) => {
            Err(CliError::from_failure(form.label(), &failure))
        }
        Submission::Busy => Err(CliError::ApiError {
            message: format!("{} is already in progress", form.label()),
            status: None,
        }),
        Submission::Declined | Submission::Settled(Settled::Succeeded { .. }) => {
            Err(CliError::ApiError {
                message: format!("{} ended unexpectedly", form.label()),
                status: None,
            })
        }
    }
}

fn print_item(item: &Item, ctx: &Ctx<'_>) -> Result<(), CliError> {
    let out = output::render_single(ctx.format, item)?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

fn id_of(raw: &str) -> EntityId {
    let Ok(id) = raw.trim().parse::<EntityId>();
    id
}

fn id_item(raw: &str) -> Item {
    Item::empty().with("id", id_of(raw).to_value())
}
