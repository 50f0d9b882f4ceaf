use std::fmt;
use std::path::PathBuf;

use zeroize::Zeroizing;

/// Where a listed or resolved credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    Keychain,
    Config,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Keychain => "keychain",
            CredentialSource::Config => "config",
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PEM text of a private key. Wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct PrivateKeyPem(Zeroizing<String>);

impl PrivateKeyPem {
    /// Wrap PEM text, returning `None` for blank input.
    pub fn new(pem: impl Into<String>) -> Option<Self> {
        let pem = pem.into();
        if pem.trim().is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(pem)))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for PrivateKeyPem {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for PrivateKeyPem {}

impl fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyPem(<redacted>)")
    }
}

/// One named signing identity: key ID, issuer ID and private key.
///
/// `source`, `source_path` and `is_default` are computed when listing or
/// resolving and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub name: String,
    pub key_id: String,
    pub issuer_id: String,
    pub private_key_path: String,
    pub private_key_pem: Option<PrivateKeyPem>,
    pub source: Option<CredentialSource>,
    /// Config file a config-sourced credential was read from.
    pub source_path: Option<PathBuf>,
    pub is_default: bool,
}

impl Credential {
    pub fn new(
        name: impl Into<String>,
        key_id: impl Into<String>,
        issuer_id: impl Into<String>,
        private_key_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            key_id: key_id.into(),
            issuer_id: issuer_id.into(),
            private_key_path: private_key_path.into(),
            private_key_pem: None,
            source: None,
            source_path: None,
            is_default: false,
        }
    }

    /// True when key ID, issuer ID and some key material are all present.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.key_id.trim().is_empty() {
            missing.push("key ID");
        }
        if self.issuer_id.trim().is_empty() {
            missing.push("issuer ID");
        }
        if self.private_key_path.trim().is_empty() && self.private_key_pem.is_none() {
            missing.push("private key");
        }
        missing
    }

    /// Label describing where this credential is stored, e.g. `config: /path`.
    pub fn storage_label(&self) -> String {
        match (&self.source, &self.source_path) {
            (Some(source), Some(path)) => format!("{source}: {}", path.display()),
            (Some(source), None) => source.to_string(),
            _ => "unknown".to_string(),
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Key ID: {})", self.name, self.key_id)?;
        if self.is_default {
            write!(f, " (default)")?;
        }
        Ok(())
    }
}
