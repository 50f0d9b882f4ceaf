use std::path::PathBuf;

use crate::core::models::credential::Credential;

/// All domain errors for credential resolution and storage.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("System keychain is not available on this platform or session")]
    KeychainUnavailable,

    #[error(
        "Keychain access denied: {detail}\n\n  \
         The operating system refused access to the stored credentials.\n  \
         No other credential source was tried.\n\n  \
         Solutions:\n    \
         → Unlock your keychain and run the command again\n    \
         → Allow access when the system prompt appears\n    \
         → Or set ASC_BYPASS_KEYCHAIN=1 to use config/env credentials only"
    )]
    KeychainAccessDenied { detail: String },

    #[error("Keychain error: {detail}")]
    Keychain { detail: String },

    #[error(
        "Credential '{name}' not found\n\n  \
         Profile names are case-sensitive.\n  \
         Run 'asc auth status' to see stored credentials."
    )]
    CredentialNotFound { name: String },

    #[error(
        "Default credential '{name}' not found\n\n  \
         The configured default profile does not exist in the keychain or config file.\n\n  \
         Solutions:\n    \
         → Pick an existing profile: asc auth switch --name <profile>\n    \
         → Or register it again: asc auth login --name {name} ..."
    )]
    DefaultNotFound { name: String },

    #[error(
        "No default credential configured ({count} profiles stored)\n\n  \
         Select one explicitly with --profile <name> or ASC_PROFILE,\n  \
         or set a default: asc auth switch --name <profile>"
    )]
    DefaultNotConfigured { count: usize },

    #[error(
        "No credentials configured\n\n  \
         Solutions:\n    \
         → Store a profile: asc auth login --name <profile> --key-id <id> --issuer-id <id> --private-key <path>\n    \
         → Or set ASC_KEY_ID, ASC_ISSUER_ID and ASC_PRIVATE_KEY_PATH"
    )]
    NoCredentials,

    #[error("Invalid profile name: {detail}")]
    InvalidProfileName { detail: String },

    #[error(
        "Incomplete credentials: missing {missing}\n\n  \
         Set ASC_KEY_ID, ASC_ISSUER_ID, and one of ASC_PRIVATE_KEY_PATH, \
         ASC_PRIVATE_KEY or ASC_PRIVATE_KEY_B64,\n  \
         or run 'asc auth login' to store a profile."
    )]
    IncompleteCredentials { missing: String },

    #[error(
        "Config already exists at {path}\n\n  \
         Use --force to overwrite it."
    )]
    ConfigExists { path: PathBuf },

    #[error("Invalid configuration in {path}: {detail}")]
    InvalidConfig { path: PathBuf, detail: String },

    #[error("Invalid private key{}: {detail}", display_path(.path))]
    InvalidPrivateKey {
        path: Option<PathBuf>,
        detail: String,
    },

    #[error(
        "Private key file {path} has insecure permissions {mode:04o}\n\n  \
         Key files must not be readable by group or others.\n  \
         Fix: chmod 600 {path}"
    )]
    InsecureKeyFile { path: PathBuf, mode: u32 },

    #[error("Invalid ASC_PRIVATE_KEY_B64 value: {detail}")]
    InvalidBase64 { detail: String },

    #[error(
        "Credentials loaded from multiple sources ({detail})\n\n  \
         Strict auth is enabled, so mixing sources is not allowed.\n  \
         Use a single profile, or provide all values through the environment."
    )]
    MixedSources { detail: String },

    #[error("{source}")]
    PartialListing {
        credentials: Vec<Credential>,
        source: Box<AuthError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" at {}", p.display()),
        None => String::new(),
    }
}

impl AuthError {
    /// Whether this error (or the error behind a partial listing) is the
    /// keychain access-denied sentinel.
    pub fn is_access_denied(&self) -> bool {
        match self {
            AuthError::KeychainAccessDenied { .. } => true,
            AuthError::PartialListing { source, .. } => source.is_access_denied(),
            _ => false,
        }
    }

    /// Whether no credential of the requested name exists anywhere.
    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AuthError::CredentialNotFound { .. }
                | AuthError::DefaultNotFound { .. }
                | AuthError::NoCredentials
        )
    }

    /// Credentials gathered before a listing failed. Empty for other errors.
    pub fn partial_credentials(&self) -> &[Credential] {
        match self {
            AuthError::PartialListing { credentials, .. } => credentials,
            _ => &[],
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuthError>;
