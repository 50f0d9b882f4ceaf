use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{AuthError, Result};

/// Execute the `asc auth switch` command.
pub fn execute(ctx: &Context, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidProfileName {
            detail: "--name cannot be blank".into(),
        });
    }

    ctx.resolver().set_default_credentials(name)?;

    output::success(&format!("Default profile set to '{name}'"));
    Ok(())
}
