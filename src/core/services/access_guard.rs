use crate::core::errors::{AuthError, Result};
use crate::core::models::credential_sources::CredentialSources;

/// Outcome of checking where the three credential fields came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCheck {
    Uniform,
    /// Sources disagree; the caller should print this warning.
    Warn(String),
}

/// Reject or flag credentials assembled from more than one source.
///
/// Mixing sources risks pairing the key ID of one identity with the private
/// key of another. Strict mode turns the warning into an error.
pub fn check_mixed_credential_sources(sources: &CredentialSources, strict: bool) -> Result<SourceCheck> {
    if !sources.is_mixed() {
        return Ok(SourceCheck::Uniform);
    }
    if strict {
        return Err(AuthError::MixedSources {
            detail: sources.to_string(),
        });
    }
    Ok(SourceCheck::Warn(format!(
        "credentials loaded from multiple sources ({sources}); set ASC_STRICT_AUTH=1 to reject this"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::credential_sources::SourceTag;

    fn mixed() -> CredentialSources {
        CredentialSources {
            key_id: SourceTag::Keychain,
            issuer_id: SourceTag::Keychain,
            key_material: SourceTag::Env,
        }
    }

    #[test]
    fn uniform_sources_pass_in_strict_mode() {
        let sources = CredentialSources::uniform(SourceTag::Config);
        assert_eq!(
            check_mixed_credential_sources(&sources, true).unwrap(),
            SourceCheck::Uniform
        );
    }

    #[test]
    fn mixed_sources_warn_by_default() {
        match check_mixed_credential_sources(&mixed(), false).unwrap() {
            SourceCheck::Warn(message) => {
                assert!(message.contains("private key: env"));
            }
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn mixed_sources_fail_in_strict_mode() {
        let err = check_mixed_credential_sources(&mixed(), true).unwrap_err();
        assert!(matches!(err, AuthError::MixedSources { .. }));
        assert!(err.to_string().contains("key ID: keychain"));
    }
}
