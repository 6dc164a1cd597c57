//! Command dispatch: bridges CLI args -> core console -> output formatting.

pub mod config_cmd;
pub mod resources;
pub mod util;

use std::sync::Arc;

use sensordesk_core::{ConfirmationGate, Console, Notifier, ResourceKind};

use crate::cli::{Command, GlobalOpts, ResourceArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{self, TerminalNotifier};

/// Dispatch a server-bound command to the resource handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let (kind, args) = match cmd {
        Command::Devices(args) => (ResourceKind::Devices, args),
        Command::Sensors(args) => (ResourceKind::Sensors, args),
        Command::Actuators(args) => (ResourceKind::Actuators, args),
        Command::Rules(args) => (ResourceKind::Rules, args),
        Command::Users(args) => (ResourceKind::Users, args),
        Command::Models(args) => (ResourceKind::Models, args),
        Command::Config(args) => return config_cmd::handle(args, global),
        // Completions are generated before dispatch
        Command::Completions(_) => unreachable!(),
    };
    run_resource(kind, args, global).await
}

async fn run_resource(
    kind: ResourceKind,
    args: ResourceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let console_config = config::resolve_console_config(global, &cfg)?;
    let ctx = resources::Ctx {
        global,
        format: config::output_format(global, &cfg),
    };

    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier {
        color: output::should_color(global.color),
        quiet: global.quiet,
    });
    let gate: Option<Arc<dyn ConfirmationGate>> = if global.yes {
        None
    } else {
        Some(Arc::new(util::PromptGate { kind }))
    };

    let console = Console::connect(console_config, notifier, gate)?;
    tracing::debug!(?kind, console = ?console, "dispatching command");
    resources::handle(kind, args.command, &console, &ctx).await
}
