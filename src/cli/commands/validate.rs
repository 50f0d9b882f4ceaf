use serde::Serialize;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::services::credential_chain::resolve_credentials;
use crate::core::services::key_material::{KeyMaterialLoader, key_fingerprint};

/// JSON report printed by `asc auth validate`.
#[derive(Debug, Default, Serialize)]
struct ValidateReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_id: Option<String>,
    /// Backend the credentials came from: `keychain`, `config` or `env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Execute the `asc auth validate` command.
///
/// Resolves credentials exactly as API commands would, loads the private key
/// and prints a JSON report. Fails after printing when anything is invalid.
pub fn execute(ctx: &Context, loader: &mut KeyMaterialLoader, pretty: bool) -> Result<()> {
    let mut report = ValidateReport {
        profile: ctx.settings.profile.clone(),
        ..Default::default()
    };

    let resolver = ctx.resolver();
    let resolved = match resolve_credentials(&ctx.settings, &resolver, loader) {
        Ok(resolved) => resolved,
        Err(e) => {
            report.errors.push(e.to_string());
            output::json(&report, pretty)?;
            return Err(e);
        }
    };
    if let Some(warning) = &resolved.source_warning {
        output::warning(warning);
    }

    report.profile = resolved.profile.clone().or(report.profile);
    report.key_id = Some(resolved.key_id.clone());
    report.issuer_id = Some(resolved.issuer_id.clone());
    report.source = Some(resolved.source.map_or("env", |s| s.as_str()));
    report.private_key_path = resolved.key_path().map(|p| p.display().to_string());

    match resolved.signing_key() {
        Ok(key) => {
            report.fingerprint = Some(key_fingerprint(&key));
            report.valid = true;
            output::json(&report, pretty)
        }
        Err(e) => {
            report.errors.push(format!("invalid private key: {e}"));
            output::json(&report, pretty)?;
            Err(e)
        }
    }
}
