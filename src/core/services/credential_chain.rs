use std::path::Path;

use p256::SecretKey;

use crate::config::settings::AuthSettings;
use crate::core::errors::{AuthError, Result};
use crate::core::models::credential::{Credential, CredentialSource};
use crate::core::models::credential_sources::{CredentialSources, SourceTag};
use crate::core::services::access_guard::{SourceCheck, check_mixed_credential_sources};
use crate::core::services::key_material::{KeyInputs, KeyMaterial, KeyMaterialLoader, load_signing_key};
use crate::core::traits::credential_lookup::CredentialLookup;

/// Credentials ready for signing requests in one command invocation.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    /// Stored profile the credentials came from, `None` for env-only.
    pub profile: Option<String>,
    pub key_id: String,
    pub issuer_id: String,
    pub key: KeyMaterial,
    pub sources: CredentialSources,
    /// Backend of the stored credential, `None` for env-only.
    pub source: Option<CredentialSource>,
    /// Set when fields came from more than one source and strict mode is off.
    pub source_warning: Option<String>,
}

impl ResolvedCredentials {
    /// The key file in use. `None` when the key came from a stored PEM.
    pub fn key_path(&self) -> Option<&Path> {
        self.key.path()
    }

    pub fn signing_key(&self) -> Result<SecretKey> {
        load_signing_key(&self.key)
    }
}

/// Resolve the credentials a command should sign with.
///
/// An explicit profile must resolve and never falls back to the environment.
/// In bypass mode complete environment credentials win. Otherwise the stored
/// default is used, with the environment filling missing fields or standing
/// in when nothing is stored. Keychain access denial always aborts.
pub fn resolve_credentials(
    settings: &AuthSettings,
    lookup: &dyn CredentialLookup,
    loader: &mut KeyMaterialLoader,
) -> Result<ResolvedCredentials> {
    if let Some(profile) = settings.profile.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        let stored = lookup.get_credentials_with_source(profile)?;
        return assemble(settings, Some(stored), false, loader);
    }

    if settings.bypass_keychain && settings.has_complete_env_credentials() {
        tracing::debug!("keychain bypassed; using environment credentials");
        return assemble(settings, None, true, loader);
    }

    let stored = match lookup.get_credentials_with_source("") {
        Ok(stored) => Some(stored),
        Err(e) if e.is_access_denied() => return Err(e),
        Err(e) if !settings.has_env_credentials() => return Err(e),
        Err(e) => {
            tracing::debug!(error = %e, "no stored credentials; using environment");
            None
        }
    };
    assemble(settings, stored, true, loader)
}

fn assemble(
    settings: &AuthSettings,
    stored: Option<(Credential, CredentialSource)>,
    use_env: bool,
    loader: &mut KeyMaterialLoader,
) -> Result<ResolvedCredentials> {
    let (cred, source) = match stored {
        Some((cred, source)) => (Some(cred), Some(source)),
        None => (None, None),
    };
    let stored_tag = match source {
        Some(CredentialSource::Keychain) => SourceTag::Keychain,
        _ => SourceTag::Config,
    };
    let env = |value: &Option<String>| if use_env { value.clone() } else { None };
    let pick = |stored: Option<&str>, env: Option<String>| {
        stored
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| (v.to_string(), stored_tag))
            .or_else(|| env.map(|v| (v, SourceTag::Env)))
    };

    let key_id = pick(cred.as_ref().map(|c| c.key_id.as_str()), env(&settings.key_id));
    let issuer_id = pick(cred.as_ref().map(|c| c.issuer_id.as_str()), env(&settings.issuer_id));

    let stored_key = match &cred {
        Some(c) => loader.resolve(KeyInputs {
            pem: c.private_key_pem.as_ref(),
            path: Some(c.private_key_path.as_str()),
            ..Default::default()
        })?,
        None => None,
    };
    let key = match stored_key {
        Some(material) => Some((material, stored_tag)),
        None if use_env => loader
            .resolve(KeyInputs {
                pem: None,
                path: settings.private_key_path.as_deref(),
                base64: settings.private_key_b64.as_deref(),
                raw: settings.private_key.as_deref(),
            })?
            .map(|material| (material, SourceTag::Env)),
        None => None,
    };

    let mut missing = Vec::new();
    if key_id.is_none() {
        missing.push("key ID");
    }
    if issuer_id.is_none() {
        missing.push("issuer ID");
    }
    if key.is_none() {
        missing.push("private key");
    }
    let (Some((key_id, key_id_tag)), Some((issuer_id, issuer_tag)), Some((key, key_tag))) =
        (key_id, issuer_id, key)
    else {
        return Err(AuthError::IncompleteCredentials {
            missing: missing.join(", "),
        });
    };

    let sources = CredentialSources {
        key_id: key_id_tag,
        issuer_id: issuer_tag,
        key_material: key_tag,
    };
    let source_warning = match check_mixed_credential_sources(&sources, settings.strict_auth)? {
        SourceCheck::Uniform => None,
        SourceCheck::Warn(message) => Some(message),
    };

    Ok(ResolvedCredentials {
        profile: cred.map(|c| c.name).filter(|n| !n.is_empty()),
        key_id,
        issuer_id,
        key,
        sources,
        source,
        source_warning,
    })
}
