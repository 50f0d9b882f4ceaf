mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::context::Context;
use cli::{AuthAction, Cli, Commands};
use crate::core::services::key_material::KeyMaterialLoader;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "ASC_LOG";

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let ctx = Context::from_cli(&args);
    let mut loader = KeyMaterialLoader::new();

    let result = match &args.command {
        Commands::Auth { action } => match action {
            AuthAction::Init { local, force } => cli::commands::init::execute(&ctx, *local, *force),
            AuthAction::Login {
                name,
                key_id,
                issuer_id,
                private_key,
                bypass_keychain,
                local,
                skip_validation,
            } => cli::commands::login::execute(
                &ctx,
                &cli::commands::login::LoginArgs {
                    name,
                    key_id,
                    issuer_id,
                    private_key,
                    bypass_keychain: *bypass_keychain,
                    local: *local,
                    skip_validation: *skip_validation,
                },
            ),
            AuthAction::Switch { name } => cli::commands::switch::execute(&ctx, name),
            AuthAction::Logout { name, .. } => cli::commands::logout::execute(&ctx, name.as_deref()),
            AuthAction::Status => cli::commands::status::execute(&ctx),
            AuthAction::Validate { pretty } => {
                cli::commands::validate::execute(&ctx, &mut loader, *pretty)
            }
        },
    };

    // process::exit skips destructors, so staged keys are removed here.
    loader.cleanup_temp_private_keys();

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Send diagnostics to stderr, filtered by `ASC_LOG` (default `warn`, or
/// `debug` with `--verbose`).
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
