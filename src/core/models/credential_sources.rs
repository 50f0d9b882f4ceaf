use std::fmt;

/// Origin of a single resolved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTag {
    Keychain,
    Config,
    Env,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Keychain => f.write_str("keychain"),
            SourceTag::Config => f.write_str("config"),
            SourceTag::Env => f.write_str("env"),
        }
    }
}

/// Per-field origins of one resolution, used to detect mixed sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialSources {
    pub key_id: SourceTag,
    pub issuer_id: SourceTag,
    pub key_material: SourceTag,
}

impl CredentialSources {
    pub fn uniform(tag: SourceTag) -> Self {
        Self {
            key_id: tag,
            issuer_id: tag,
            key_material: tag,
        }
    }

    pub fn is_mixed(&self) -> bool {
        self.key_id != self.issuer_id || self.issuer_id != self.key_material
    }
}

impl fmt::Display for CredentialSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key ID: {}, issuer ID: {}, private key: {}",
            self.key_id, self.issuer_id, self.key_material
        )
    }
}
