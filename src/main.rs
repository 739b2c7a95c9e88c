//! nsplan CLI entry point.

use std::collections::HashMap;
use std::process::ExitCode;

use clap::Parser;
use nsplan::cli::{report_error, Cli, CommandDispatcher};
use nsplan::context::Context;
use nsplan::settings::{load_settings, SettingsPaths};
use nsplan::system::{is_ci, is_elevated};
use nsplan::ui::{create_ui, NonInteractiveUI, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("nsplan=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nsplan=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("nsplan starting with args: {:?}", cli);

    // Handle --no-color
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let env: HashMap<String, String> = std::env::vars().collect();
    let settings = match load_settings(&SettingsPaths::discover(cli.config.as_deref()), &env) {
        Ok(settings) => settings,
        Err(e) => {
            let mut ui = NonInteractiveUI::new(cli.output_mode(OutputMode::Normal));
            report_error(&mut ui, &e);
            return ExitCode::from(e.exit_code());
        }
    };

    let is_interactive = !cli.non_interactive && !is_ci();
    let mut ui = create_ui(is_interactive, cli.output_mode(settings.default_output));

    let context = Context::new(
        &settings,
        cli.context_overrides(),
        ui.is_interactive(),
        is_elevated(),
    );
    let dispatcher = CommandDispatcher::new(context, settings.default_provider.clone());

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(u8::try_from(result.exit_code).unwrap_or(1)),
        Err(e) => {
            report_error(ui.as_mut(), &e);
            ExitCode::from(e.exit_code())
        }
    }
}
