use colored::Colorize;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{AuthError, Result};
use crate::core::models::credential::{Credential, CredentialSource};
use crate::core::services::key_material::{KeyMaterial, key_fingerprint, load_signing_key};

/// Execute the `asc auth status` command.
///
/// Shows where credentials are stored, every stored profile with the default
/// marked, and how environment overrides will be treated. A partial listing
/// is still printed before its error is returned.
pub fn execute(ctx: &Context) -> Result<()> {
    let resolver = ctx.resolver();

    let (credentials, listing_err) = match resolver.list_credentials() {
        Ok(credentials) => (credentials, None),
        Err(e) if e.partial_credentials().is_empty() => return Err(e),
        Err(e) => (e.partial_credentials().to_vec(), Some(e)),
    };

    let bypass = ctx.settings.bypass_keychain;
    let keychain = resolver.keychain_status();
    let keychain_available = matches!(keychain, Ok(true));
    let config_path = resolver.paths.active();
    let config_label = config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".into());

    let mut warnings = Vec::new();
    let (backend, location) = if bypass {
        warnings.push("Keychain bypassed via ASC_BYPASS_KEYCHAIN.".to_string());
        ("Config File", config_label.clone())
    } else if !keychain_available {
        match &keychain {
            Err(e) => warnings.push(format!("System keychain error: {e}")),
            Ok(_) => warnings
                .push("System keychain unavailable. Credentials stored in config file.".to_string()),
        }
        ("Config File", config_label.clone())
    } else {
        ("System Keychain", "system keychain".to_string())
    };

    let has_config_creds = credentials
        .iter()
        .any(|c| c.source == Some(CredentialSource::Config));
    if has_config_creds && keychain_available && !bypass {
        warnings.push("Some credentials are stored in config file (less secure).".to_string());
    }

    output::header("Authentication status");
    println!("  Credential storage: {}", backend.cyan());
    println!("  Location: {location}");
    for warning in &warnings {
        output::warning(warning);
    }
    if ctx.verbose {
        println!("  Keychain available: {keychain_available}");
        if let Err(e) = &keychain {
            println!("  Keychain error: {e}");
        }
        if let Ok(path) = &config_path {
            println!("  Config path: {}", path.display());
        }
    }

    if credentials.is_empty() {
        println!("\n  No credentials stored. Run 'asc auth login' to get started.");
    } else {
        output::header("Stored credentials");
        for cred in &credentials {
            println!("  - {cred} (stored in {})", cred.storage_label());
            if ctx.verbose {
                println!("      {}", fingerprint_line(cred));
            }
        }
    }

    print_env_notes(ctx);

    match listing_err {
        Some(AuthError::PartialListing { source, .. }) => Err(*source),
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn fingerprint_line(cred: &Credential) -> String {
    let material = match &cred.private_key_pem {
        Some(pem) => KeyMaterial::Pem(pem.clone()),
        None if !cred.private_key_path.trim().is_empty() => {
            KeyMaterial::File(cred.private_key_path.trim().into())
        }
        None => return "Key: not configured".to_string(),
    };
    match load_signing_key(&material) {
        Ok(key) => format!("Fingerprint: {}", key_fingerprint(&key)),
        Err(e) => format!("Key: {}", first_line(&e.to_string())),
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

/// Explain how environment credential overrides interact with the selection.
fn print_env_notes(ctx: &Context) {
    let settings = &ctx.settings;
    let provided = settings.has_env_credentials();
    let complete = settings.has_complete_env_credentials();

    println!();
    if let (Some(profile), true) = (&settings.profile, provided) {
        println!("  Profile {profile:?} selected; environment credentials will be ignored.");
    } else if settings.bypass_keychain && complete {
        println!(
            "  Environment credentials detected (ASC_KEY_ID: {}). With ASC_BYPASS_KEYCHAIN set, they will be used when no profile is selected.",
            settings.key_id.as_deref().unwrap_or_default()
        );
    } else if settings.bypass_keychain && provided {
        println!(
            "  Environment credentials are incomplete. Set ASC_KEY_ID, ASC_ISSUER_ID, and one of ASC_PRIVATE_KEY_PATH/ASC_PRIVATE_KEY/ASC_PRIVATE_KEY_B64."
        );
    }
}
