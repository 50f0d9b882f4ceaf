use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{AuthError, Result};

/// Execute the `asc auth logout` command.
///
/// Removes one named credential, or every stored credential when no name
/// is given.
pub fn execute(ctx: &Context, name: Option<&str>) -> Result<()> {
    let resolver = ctx.resolver();

    if let Some(raw) = name {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidProfileName {
                detail: "--name cannot be blank".into(),
            });
        }
        resolver.remove_credentials(name)?;
        output::success(&format!("Removed stored credential '{name}'"));
        return Ok(());
    }

    resolver.remove_all_credentials()?;
    output::success("Removed all stored credentials");
    Ok(())
}
