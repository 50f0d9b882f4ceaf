use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::services::credential_resolver::StorageLocation;
use crate::core::services::key_material::{key_fingerprint, load_private_key, validate_key_file};

/// Arguments of `asc auth login`.
#[derive(Debug)]
pub struct LoginArgs<'a> {
    pub name: &'a str,
    pub key_id: &'a str,
    pub issuer_id: &'a str,
    pub private_key: &'a str,
    pub bypass_keychain: bool,
    pub local: bool,
    pub skip_validation: bool,
}

/// Execute the `asc auth login` command.
///
/// Checks the key file, then stores the credential in the system keychain
/// (config file when unavailable or bypassed). The stored profile becomes
/// the default.
pub fn execute(ctx: &Context, args: &LoginArgs<'_>) -> Result<()> {
    let key_path = std::path::Path::new(args.private_key.trim());
    validate_key_file(key_path)?;

    if !args.skip_validation {
        let key = load_private_key(key_path)?;
        if ctx.verbose {
            println!("  Key fingerprint: {}", key_fingerprint(&key));
        }
    }

    let resolver = ctx.resolver();
    let bypass = args.bypass_keychain || ctx.settings.bypass_keychain;

    if bypass {
        let path = if args.local {
            ctx.paths().local_path()?
        } else {
            resolver.paths.active()?
        };
        println!("  Storing credentials in config file at {}", path.display());
        resolver.store_credentials_config_at(
            &path,
            args.name,
            args.key_id,
            args.issuer_id,
            args.private_key,
        )?;
    } else {
        if resolver.keychain_available() {
            println!("  Storing credentials in system keychain");
        }
        let location =
            resolver.store_credentials(args.name, args.key_id, args.issuer_id, args.private_key)?;
        if let StorageLocation::Config(path) = location {
            output::warning(&format!(
                "System keychain unavailable; stored credentials in config file at {}",
                path.display()
            ));
        }
    }

    output::success(&format!(
        "Successfully registered API key '{}'",
        args.name.trim()
    ));
    Ok(())
}
