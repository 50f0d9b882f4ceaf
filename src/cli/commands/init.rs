use serde_json::json;

use crate::cli::context::Context;
use crate::cli::output;
use crate::config::auth_config::AuthConfig;
use crate::core::errors::{AuthError, Result};

/// Execute the `asc auth init` command.
///
/// Writes an empty config template to `~/.asc/config.json`, or to
/// `./.asc/config.json` with `--local`, and prints the result as JSON.
pub fn execute(ctx: &Context, local: bool, force: bool) -> Result<()> {
    let paths = ctx.paths();
    let path = if local {
        paths.local_path()?
    } else {
        paths.global_path()?
    };

    if !force && path.exists() {
        return Err(AuthError::ConfigExists { path });
    }

    let template = AuthConfig::default();
    template.save_at(&path)?;
    tracing::debug!(path = %path.display(), "wrote config template");

    output::json(
        &json!({
            "config_path": path.display().to_string(),
            "created": true,
            "config": template,
        }),
        true,
    )
}
