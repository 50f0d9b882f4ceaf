use std::path::{Path, PathBuf};

use crate::config::auth_config::{AuthConfig, ProfileEntry};
use crate::config::paths::ConfigPaths;
use crate::core::errors::{AuthError, Result};
use crate::core::models::credential::{Credential, CredentialSource};
use crate::core::models::payload::{CredentialPayload, credential_name, keyring_key};
use crate::core::services::key_material::capture_key_pem;
use crate::core::services::migration::migrate;
use crate::core::traits::credential_lookup::CredentialLookup;
use crate::core::traits::keyring::{Keyring, KeyringError, KeyringOpener, Namespace};

/// Where `store_credentials` put a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Keychain,
    Config(PathBuf),
}

/// Resolves, lists and stores credentials across the keychain and the
/// config file scopes.
///
/// Keychain entries shadow config profiles of the same name. Legacy
/// keychain entries are migrated into the current namespace on every read.
pub struct CredentialResolver<O: KeyringOpener> {
    pub opener: O,
    pub paths: ConfigPaths,
    pub bypass_keychain: bool,
}

impl<O: KeyringOpener> CredentialResolver<O> {
    pub fn new(opener: O, paths: ConfigPaths, bypass_keychain: bool) -> Self {
        Self {
            opener,
            paths,
            bypass_keychain,
        }
    }

    /// Whether the current keychain namespace can be opened.
    /// Always false in bypass mode, without touching the keychain.
    pub fn keychain_available(&self) -> bool {
        matches!(self.keychain_status(), Ok(true))
    }

    /// Like `keychain_available`, but reports why opening failed.
    pub fn keychain_status(&self) -> Result<bool> {
        if self.bypass_keychain {
            return Ok(false);
        }
        Ok(self.open(Namespace::Current)?.is_some())
    }

    /// All credentials, deduplicated by name with keychain precedence.
    ///
    /// When one source fails after others produced entries, the error is a
    /// `PartialListing` carrying those entries.
    pub fn list_credentials(&self) -> Result<Vec<Credential>> {
        let (keychain, keychain_err) = self.read_keychain();

        let (mut merged, default_name, config_err) = match self.read_config() {
            Ok((path, cfg)) => (
                merge(keychain, config_credentials(&path, &cfg)),
                cfg.default_key_name.trim().to_string(),
                None,
            ),
            Err(e) => (keychain, String::new(), Some(e)),
        };
        mark_default(&mut merged, &default_name);

        match keychain_err.or(config_err) {
            None => Ok(merged),
            Some(err) if merged.is_empty() => Err(err),
            Some(err) => Err(AuthError::PartialListing {
                credentials: merged,
                source: Box::new(err),
            }),
        }
    }

    /// Resolve one credential and report which backend held it.
    ///
    /// An empty `name` resolves the configured default. A configured default
    /// that does not exist is an error; without a configured default the
    /// only stored credential is used, or the legacy flat config fields when
    /// no profile exists at all.
    pub fn get_credentials_with_source(&self, name: &str) -> Result<(Credential, CredentialSource)> {
        let name = name.trim();
        let (keychain, keychain_err) = self.read_keychain();
        let keychain_err = match keychain_err {
            Some(err) if err.is_access_denied() => return Err(err),
            Some(err) => {
                tracing::warn!(error = %err, "keychain lookup failed; continuing with config");
                Some(err)
            }
            None => None,
        };

        let (config, config_err) = match self.read_config() {
            Ok(found) => (Some(found), None),
            Err(e) => (None, Some(e)),
        };

        let default_name = config
            .as_ref()
            .map(|(_, cfg)| cfg.default_key_name.trim().to_string())
            .unwrap_or_default();
        let wanted = if name.is_empty() {
            default_name.clone()
        } else {
            name.to_string()
        };

        if !wanted.is_empty() {
            let is_default = wanted == default_name;
            if let Some(cred) = keychain.into_iter().find(|c| c.name == wanted) {
                let mut cred = self.backfill(cred);
                cred.is_default = is_default;
                return Ok((cred, CredentialSource::Keychain));
            }
            if let Some((path, cfg)) = &config {
                if let Some(profile) = cfg.profile(&wanted) {
                    let mut cred = profile.to_credential(path);
                    cred.is_default = is_default;
                    return Ok((cred, CredentialSource::Config));
                }
            }
            if let Some(err) = config_err.or(keychain_err) {
                return Err(err);
            }
            return Err(if name.is_empty() {
                AuthError::DefaultNotFound { name: wanted }
            } else {
                AuthError::CredentialNotFound { name: wanted }
            });
        }

        let config_creds = config
            .as_ref()
            .map(|(path, cfg)| config_credentials(path, cfg))
            .unwrap_or_default();
        let mut merged = merge(keychain, config_creds);
        match merged.len() {
            0 => {}
            1 => {
                let mut cred = merged.remove(0);
                cred.is_default = true;
                return Ok(match cred.source {
                    Some(CredentialSource::Keychain) => {
                        (self.backfill(cred), CredentialSource::Keychain)
                    }
                    _ => (cred, CredentialSource::Config),
                });
            }
            count => return Err(AuthError::DefaultNotConfigured { count }),
        }

        if let Some(err) = config_err.or(keychain_err) {
            return Err(err);
        }
        match config.and_then(|(path, cfg)| cfg.legacy_credential(&path)) {
            Some(cred) if cred.is_complete() => Ok((cred, CredentialSource::Config)),
            Some(cred) => Err(AuthError::IncompleteCredentials {
                missing: cred.missing_fields().join(", "),
            }),
            None => Err(AuthError::NoCredentials),
        }
    }

    /// Make `name` the default after checking that it exists.
    pub fn set_default_credentials(&self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let creds = match self.list_credentials() {
            Ok(creds) => creds,
            Err(e) if e.is_access_denied() => return Err(e),
            Err(AuthError::PartialListing { credentials, .. }) => credentials,
            Err(e) => return Err(e),
        };
        if !creds.iter().any(|c| c.name == name) {
            return Err(AuthError::CredentialNotFound {
                name: name.to_string(),
            });
        }
        self.save_default_name(name)
    }

    /// Record `name` as the default in the active config file and realign
    /// its legacy flat fields.
    pub fn save_default_name(&self, name: &str) -> Result<()> {
        let path = self.paths.active()?;
        let mut cfg = AuthConfig::load_at(&path)?;
        cfg.set_default(name.trim());
        cfg.save_at(&path)
    }

    /// Store a credential in the keychain, falling back to the active config
    /// file when no keychain exists. The stored profile becomes the default.
    ///
    /// The key file's PEM is captured into keychain entries when readable, so
    /// the entry keeps working after the file is deleted.
    pub fn store_credentials(
        &self,
        name: &str,
        key_id: &str,
        issuer_id: &str,
        key_path: &str,
    ) -> Result<StorageLocation> {
        let name = validate_name(name)?;
        if self.bypass_keychain {
            return self
                .store_credentials_config(name, key_id, issuer_id, key_path)
                .map(StorageLocation::Config);
        }

        let Some(keyring) = self.open(Namespace::Current)? else {
            tracing::debug!("keychain unavailable; storing credentials in config");
            return self
                .store_credentials_config(name, key_id, issuer_id, key_path)
                .map(StorageLocation::Config);
        };

        let cred = capture_credential(name, key_id, issuer_id, key_path);
        let json = payload_json(&cred)?;
        match keyring.set(&keyring_key(name), &json) {
            Ok(()) => {}
            Err(KeyringError::NoAvailImpl) => {
                return self
                    .store_credentials_config(name, key_id, issuer_id, key_path)
                    .map(StorageLocation::Config);
            }
            Err(e) => return Err(keyring_error(e)),
        }
        tracing::debug!(name, "stored credentials in keychain");

        self.purge_config_profiles(name, None)?;
        self.save_default_name(name)?;
        Ok(StorageLocation::Keychain)
    }

    /// Store a credential as a profile in the active config file.
    pub fn store_credentials_config(
        &self,
        name: &str,
        key_id: &str,
        issuer_id: &str,
        key_path: &str,
    ) -> Result<PathBuf> {
        let path = self.paths.active()?;
        self.store_credentials_config_at(&path, name, key_id, issuer_id, key_path)?;
        Ok(path)
    }

    /// Store a credential as a profile in the config file at `path` and make
    /// it the default there. Same-name profiles in other scopes are removed.
    pub fn store_credentials_config_at(
        &self,
        path: &Path,
        name: &str,
        key_id: &str,
        issuer_id: &str,
        key_path: &str,
    ) -> Result<()> {
        let name = validate_name(name)?;
        let mut cfg = AuthConfig::load_at(path)?;
        cfg.upsert_profile(ProfileEntry::new(
            name,
            key_id.trim(),
            issuer_id.trim(),
            key_path.trim(),
        ));
        cfg.set_default(name);
        cfg.save_at(path)?;
        tracing::debug!(name, path = %path.display(), "stored credentials in config");

        self.purge_config_profiles(name, Some(path))
    }

    /// Remove `name` from both keychain namespaces and every config scope.
    pub fn remove_credentials(&self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let mut removed = false;

        if !self.bypass_keychain {
            for namespace in [Namespace::Current, Namespace::Legacy] {
                let Some(keyring) = self.open(namespace)? else {
                    continue;
                };
                match keyring.remove(&keyring_key(name)) {
                    Ok(()) => {
                        tracing::debug!(name, %namespace, "removed keychain entry");
                        removed = true;
                    }
                    Err(KeyringError::KeyNotFound) => {}
                    Err(e) => return Err(keyring_error(e)),
                }
            }
        }

        for scope in self.paths.scopes() {
            if !scope.is_file() {
                continue;
            }
            let mut cfg = AuthConfig::load_at(&scope)?;
            if cfg.remove_profile(name) {
                cfg.save_at(&scope)?;
                removed = true;
            }
        }

        if removed {
            Ok(())
        } else {
            Err(AuthError::CredentialNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Remove every credential from both keychain namespaces and every config
    /// scope.
    pub fn remove_all_credentials(&self) -> Result<()> {
        if !self.bypass_keychain {
            for namespace in [Namespace::Current, Namespace::Legacy] {
                let Some(keyring) = self.open(namespace)? else {
                    continue;
                };
                let keys = keyring.keys().map_err(keyring_error)?;
                for key in keys.iter().filter(|k| credential_name(k).is_some()) {
                    match keyring.remove(key) {
                        Ok(()) | Err(KeyringError::KeyNotFound) => {}
                        Err(e) => return Err(keyring_error(e)),
                    }
                }
            }
        }

        for scope in self.paths.scopes() {
            if !scope.is_file() {
                continue;
            }
            let mut cfg = AuthConfig::load_at(&scope)?;
            cfg.clear_credentials();
            cfg.save_at(&scope)?;
            tracing::debug!(path = %scope.display(), "cleared config credentials");
        }
        Ok(())
    }

    fn open(&self, namespace: Namespace) -> Result<Option<Box<dyn Keyring>>> {
        match self.opener.open(namespace) {
            Ok(keyring) => Ok(Some(keyring)),
            Err(KeyringError::NoAvailImpl) => {
                tracing::debug!(%namespace, "keychain not available");
                Ok(None)
            }
            Err(e) => Err(keyring_error(e)),
        }
    }

    /// Migrate legacy entries, then read every credential in the keychain.
    ///
    /// Returns what was read before a failure together with the failure.
    fn read_keychain(&self) -> (Vec<Credential>, Option<AuthError>) {
        let mut creds = Vec::new();
        if self.bypass_keychain {
            return (creds, None);
        }

        let current = match self.open(Namespace::Current) {
            Ok(Some(keyring)) => keyring,
            Ok(None) => return (creds, None),
            Err(e) => return (creds, Some(e)),
        };
        let legacy = match self.open(Namespace::Legacy) {
            Ok(legacy) => legacy,
            Err(e) if e.is_access_denied() => return (creds, Some(e)),
            Err(e) => {
                tracing::warn!(error = %e, "cannot open legacy keychain");
                None
            }
        };

        if let Some(legacy) = &legacy {
            match migrate(current.as_ref(), legacy.as_ref()) {
                Ok(0) => {}
                Ok(moved) => tracing::debug!(moved, "migrated legacy keychain entries"),
                Err(e) => {
                    let err = keyring_error(e);
                    if err.is_access_denied() {
                        return (creds, Some(err));
                    }
                    tracing::warn!(error = %err, "legacy keychain migration failed");
                }
            }
        }

        if let Err(e) = read_namespace(current.as_ref(), &mut creds) {
            return (creds, Some(e));
        }
        // Entries a failed migration left behind.
        if let Some(legacy) = &legacy {
            if let Err(e) = read_namespace(legacy.as_ref(), &mut creds) {
                tracing::debug!(error = %e, "cannot read legacy keychain");
            }
        }
        (creds, None)
    }

    fn read_config(&self) -> Result<(PathBuf, AuthConfig)> {
        let path = self.paths.active()?;
        let cfg = AuthConfig::load_at(&path)?;
        Ok((path, cfg))
    }

    /// Embed the key file's PEM into a keychain entry stored without one.
    fn backfill(&self, mut cred: Credential) -> Credential {
        if cred.private_key_pem.is_some() || cred.private_key_path.trim().is_empty() {
            return cred;
        }
        let path = PathBuf::from(cred.private_key_path.trim());
        match capture_key_pem(&path) {
            Ok(pem) => {
                cred.private_key_pem = Some(pem);
                match self.write_keychain(&cred) {
                    Ok(()) => tracing::debug!(name = %cred.name, "backfilled private key into keychain entry"),
                    Err(e) => tracing::warn!(name = %cred.name, error = %e, "failed to backfill keychain entry"),
                }
            }
            Err(e) => tracing::debug!(name = %cred.name, error = %e, "cannot backfill keychain entry"),
        }
        cred
    }

    fn write_keychain(&self, cred: &Credential) -> Result<()> {
        let keyring = self
            .open(Namespace::Current)?
            .ok_or(AuthError::KeychainUnavailable)?;
        keyring
            .set(&keyring_key(&cred.name), &payload_json(cred)?)
            .map_err(keyring_error)
    }

    /// Drop profiles named `name` from every config scope except `except`.
    fn purge_config_profiles(&self, name: &str, except: Option<&Path>) -> Result<()> {
        for scope in self.paths.scopes() {
            if except == Some(scope.as_path()) || !scope.is_file() {
                continue;
            }
            let mut cfg = match AuthConfig::load_at(&scope) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(path = %scope.display(), error = %e, "skipping unreadable config");
                    continue;
                }
            };
            if cfg.remove_profile(name) {
                cfg.save_at(&scope)?;
                tracing::debug!(name, path = %scope.display(), "removed stale config profile");
            }
        }
        Ok(())
    }
}

impl<O: KeyringOpener> CredentialLookup for CredentialResolver<O> {
    fn get_credentials_with_source(&self, name: &str) -> Result<(Credential, CredentialSource)> {
        CredentialResolver::get_credentials_with_source(self, name)
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidProfileName {
            detail: "name must not be empty".into(),
        });
    }
    Ok(name)
}

/// Build the credential to store, capturing the key file's PEM when it exists.
fn capture_credential(name: &str, key_id: &str, issuer_id: &str, key_path: &str) -> Credential {
    let mut cred = Credential::new(name, key_id.trim(), issuer_id.trim(), key_path.trim());
    let path = Path::new(key_path.trim());
    if path.is_file() {
        match capture_key_pem(path) {
            Ok(pem) => cred.private_key_pem = Some(pem),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "not capturing private key"),
        }
    }
    cred
}

fn payload_json(cred: &Credential) -> Result<String> {
    CredentialPayload::from_credential(cred)
        .to_json()
        .map_err(|e| AuthError::Keychain {
            detail: format!("failed to encode credential payload: {e}"),
        })
}

/// Append every credential in `keyring` whose name is not already in `creds`.
fn read_namespace(keyring: &dyn Keyring, creds: &mut Vec<Credential>) -> Result<()> {
    let keys = keyring.keys().map_err(keyring_error)?;
    for key in &keys {
        let Some(name) = credential_name(key) else {
            continue;
        };
        if creds.iter().any(|c| c.name == name) {
            continue;
        }
        let raw = match keyring.get(key) {
            Ok(raw) => raw,
            Err(KeyringError::KeyNotFound) => continue,
            Err(e) => return Err(keyring_error(e)),
        };
        match CredentialPayload::from_json(&raw) {
            Ok(payload) => creds.push(payload.to_credential(name)),
            Err(e) => tracing::warn!(name, error = %e, "skipping unreadable keychain entry"),
        }
    }
    Ok(())
}

fn config_credentials(path: &Path, cfg: &AuthConfig) -> Vec<Credential> {
    let mut creds: Vec<Credential> = Vec::new();
    for profile in &cfg.keys {
        let name = profile.name.trim();
        if name.is_empty() || creds.iter().any(|c| c.name == name) {
            continue;
        }
        creds.push(profile.to_credential(path));
    }
    creds
}

/// Keychain entries first, then config entries with names not yet seen.
fn merge(keychain: Vec<Credential>, config: Vec<Credential>) -> Vec<Credential> {
    let mut merged = keychain;
    for cred in config {
        if !merged.iter().any(|c| c.name == cred.name) {
            merged.push(cred);
        }
    }
    merged
}

/// Flag the entry named `default_name`; with no name, a lone entry is default.
fn mark_default(creds: &mut [Credential], default_name: &str) {
    if default_name.is_empty() {
        if let [only] = creds {
            only.is_default = true;
        }
        return;
    }
    for cred in creds.iter_mut() {
        cred.is_default = cred.name == default_name;
    }
}

fn keyring_error(err: KeyringError) -> AuthError {
    match err {
        KeyringError::AccessDenied(detail) => AuthError::KeychainAccessDenied { detail },
        KeyringError::NoAvailImpl => AuthError::KeychainUnavailable,
        KeyringError::Backend(detail) => AuthError::Keychain { detail },
        other @ KeyringError::KeyNotFound => AuthError::Keychain {
            detail: other.to_string(),
        },
    }
}
