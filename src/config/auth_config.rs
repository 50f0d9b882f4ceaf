use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::{AuthError, Result};
use crate::core::models::credential::{Credential, CredentialSource};

/// On-disk credential profile store (`config.json`).
///
/// Holds named profiles plus the pre-profile single-credential fields, which
/// are kept mirroring the default profile so older readers keep working.
///
/// Example:
/// ```json
/// {
///   "defaultKeyName": "personal",
///   "keyId": "ABC123",
///   "issuerId": "00000000-0000-0000-0000-000000000000",
///   "privateKeyPath": "/Users/me/keys/AuthKey_ABC123.p8",
///   "keys": [
///     { "name": "personal", "keyId": "ABC123", "issuerId": "...", "privateKeyPath": "..." }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default)]
    pub default_key_name: String,
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub issuer_id: String,
    #[serde(default)]
    pub private_key_path: String,
    #[serde(default)]
    pub keys: Vec<ProfileEntry>,
    /// Fields written by other tools or newer releases, kept on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One named profile in the `keys` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub issuer_id: String,
    #[serde(default)]
    pub private_key_path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileEntry {
    pub fn new(name: &str, key_id: &str, issuer_id: &str, private_key_path: &str) -> Self {
        Self {
            name: name.to_string(),
            key_id: key_id.to_string(),
            issuer_id: issuer_id.to_string(),
            private_key_path: private_key_path.to_string(),
            extra: Map::new(),
        }
    }

    /// Convert to a config-sourced credential read from `path`.
    pub fn to_credential(&self, path: &Path) -> Credential {
        let mut cred = Credential::new(
            self.name.trim(),
            &self.key_id,
            &self.issuer_id,
            &self.private_key_path,
        );
        cred.source = Some(CredentialSource::Config);
        cred.source_path = Some(path.to_path_buf());
        cred
    }
}

impl AuthConfig {
    /// Load the config at `path`. A missing or empty file yields an empty config.
    pub fn load_at(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(AuthError::InvalidConfig {
                    path: path.to_path_buf(),
                    detail: format!("cannot read file: {e}"),
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|e| AuthError::InvalidConfig {
            path: path.to_path_buf(),
            detail: format!("failed to parse JSON: {e}"),
        })
    }

    /// Write the config to `path` atomically with owner-only permissions.
    ///
    /// The content goes to a sibling temp file which is synced and then
    /// renamed over `path`, so readers never observe a partial write.
    pub fn save_at(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| AuthError::InvalidConfig {
            path: path.to_path_buf(),
            detail: format!("failed to serialize config: {e}"),
        })?;
        json.push('\n');
        write_atomic(path, json.as_bytes())
    }

    /// Find a profile by exact (trimmed) name.
    pub fn profile(&self, name: &str) -> Option<&ProfileEntry> {
        self.keys.iter().find(|p| p.name.trim() == name)
    }

    /// Insert or replace the profile with the same name, keeping its position.
    pub fn upsert_profile(&mut self, entry: ProfileEntry) {
        match self.keys.iter_mut().find(|p| p.name.trim() == entry.name) {
            Some(existing) => {
                existing.key_id = entry.key_id;
                existing.issuer_id = entry.issuer_id;
                existing.private_key_path = entry.private_key_path;
            }
            None => self.keys.push(entry),
        }
    }

    /// Remove the profile named `name`. Other profiles are left untouched.
    /// Returns whether a profile was removed.
    pub fn remove_profile(&mut self, name: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|p| p.name.trim() != name);
        let removed = self.keys.len() != before;
        if removed {
            self.sync_legacy_fields();
        }
        removed
    }

    /// Set the default profile name and realign the legacy flat fields.
    pub fn set_default(&mut self, name: &str) {
        self.default_key_name = name.to_string();
        self.sync_legacy_fields();
    }

    /// Rewrite the legacy flat fields to mirror the default profile, or clear
    /// them when no profile matches the default name.
    pub fn sync_legacy_fields(&mut self) {
        let default_name = self.default_key_name.trim().to_string();
        let (key_id, issuer_id, key_path) = match self.profile(&default_name) {
            Some(p) if !default_name.is_empty() => (
                p.key_id.clone(),
                p.issuer_id.clone(),
                p.private_key_path.clone(),
            ),
            _ => Default::default(),
        };
        self.key_id = key_id;
        self.issuer_id = issuer_id;
        self.private_key_path = key_path;
    }

    /// Drop every profile, the default name and the legacy fields.
    pub fn clear_credentials(&mut self) {
        self.keys.clear();
        self.default_key_name.clear();
        self.sync_legacy_fields();
    }

    /// The pre-profile single credential, if any field of it is set.
    pub fn legacy_credential(&self, path: &Path) -> Option<Credential> {
        if self.key_id.trim().is_empty()
            && self.issuer_id.trim().is_empty()
            && self.private_key_path.trim().is_empty()
        {
            return None;
        }
        let mut cred = Credential::new(
            self.default_key_name.trim(),
            self.key_id.trim(),
            self.issuer_id.trim(),
            self.private_key_path.trim(),
        );
        cred.source = Some(CredentialSource::Config);
        cred.source_path = Some(path.to_path_buf());
        Some(cred)
    }
}

/// Write `data` to `path` via temp file and rename, refusing to replace a symlink.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let invalid = |detail: String| AuthError::InvalidConfig {
        path: path.to_path_buf(),
        detail,
    };

    if let Ok(meta) = std::fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() {
            return Err(invalid("refusing to overwrite a symlink".into()));
        }
        if meta.is_dir() {
            return Err(invalid("path is a directory".into()));
        }
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    create_private_dir(&dir)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".config-")
        .suffix(".tmp")
        .tempfile_in(&dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    set_owner_only(temp.path())?;
    temp.persist(path).map_err(|e| invalid(format!("failed to replace file: {}", e.error)))?;
    Ok(())
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<()> {
    Ok(())
}
