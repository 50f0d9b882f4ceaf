use std::collections::BTreeSet;

use crate::core::traits::keyring::{Keyring, KeyringError, KeyringOpener, Namespace};

/// Reserved entry holding the list of keys stored in a service.
///
/// The OS stores cannot enumerate entries, so the adapter keeps its own index.
const INDEX_KEY: &str = "__asc_index__";

/// Opens namespaces of the platform secret store:
/// macOS Keychain, Secret Service on Linux, Windows Credential Manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeyringOpener;

impl OsKeyringOpener {
    pub fn new() -> Self {
        Self
    }
}

impl KeyringOpener for OsKeyringOpener {
    fn open(&self, namespace: Namespace) -> Result<Box<dyn Keyring>, KeyringError> {
        let store = OsKeyring {
            service: namespace.service_name(),
        };

        // Touching the index surfaces a missing or locked store up front.
        match store.entry(INDEX_KEY)?.get_password() {
            Ok(_) | Err(keyring::Error::NoEntry) => {}
            Err(keyring::Error::NoStorageAccess(e)) => {
                return Err(KeyringError::AccessDenied(e.to_string()));
            }
            Err(keyring::Error::PlatformFailure(e)) => {
                return match KeyringError::from_platform_message(e.to_string()) {
                    denied @ KeyringError::AccessDenied(_) => Err(denied),
                    _ => {
                        tracing::debug!(service = store.service, error = %e, "keyring unavailable");
                        Err(KeyringError::NoAvailImpl)
                    }
                };
            }
            Err(e) => return Err(map_error(e)),
        }

        tracing::debug!(service = store.service, "opened keyring");
        Ok(Box::new(store))
    }
}

/// One service of the OS secret store.
#[derive(Debug)]
struct OsKeyring {
    service: &'static str,
}

impl OsKeyring {
    fn entry(&self, key: &str) -> Result<keyring::Entry, KeyringError> {
        keyring::Entry::new(self.service, key).map_err(map_error)
    }

    fn load_index(&self) -> Result<BTreeSet<String>, KeyringError> {
        match self.entry(INDEX_KEY)?.get_password() {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| KeyringError::Backend(format!("corrupted key index: {e}"))),
            Err(keyring::Error::NoEntry) => Ok(BTreeSet::new()),
            Err(e) => Err(map_error(e)),
        }
    }

    fn save_index(&self, index: &BTreeSet<String>) -> Result<(), KeyringError> {
        let entry = self.entry(INDEX_KEY)?;
        if index.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(map_error(e)),
            };
        }
        let json = serde_json::to_string(index)
            .map_err(|e| KeyringError::Backend(format!("failed to serialize key index: {e}")))?;
        entry.set_password(&json).map_err(map_error)
    }
}

impl Keyring for OsKeyring {
    fn get(&self, key: &str) -> Result<String, KeyringError> {
        self.entry(key)?.get_password().map_err(map_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyringError> {
        indexed_write(
            || {
                let mut index = self.load_index()?;
                if !index.insert(key.to_string()) {
                    return Ok(false);
                }
                self.save_index(&index)?;
                Ok(true)
            },
            || self.entry(key)?.set_password(value).map_err(map_error),
            || {
                let mut index = self.load_index()?;
                if index.remove(key) {
                    self.save_index(&index)?;
                }
                Ok(())
            },
        )
    }

    fn remove(&self, key: &str) -> Result<(), KeyringError> {
        let result = self.entry(key)?.delete_credential().map_err(map_error);

        // Drop stale index entries even when the item itself is already gone.
        let mut index = self.load_index()?;
        if index.remove(key) {
            self.save_index(&index)?;
        }
        result
    }

    fn keys(&self) -> Result<Vec<String>, KeyringError> {
        Ok(self.load_index()?.into_iter().collect())
    }
}

/// Register a key in the index before writing its entry, so every stored
/// entry stays listable. A failed write drops a freshly added index key.
fn indexed_write(
    register: impl FnOnce() -> Result<bool, KeyringError>,
    write: impl FnOnce() -> Result<(), KeyringError>,
    unregister: impl FnOnce() -> Result<(), KeyringError>,
) -> Result<(), KeyringError> {
    let added = register()?;
    if let Err(e) = write() {
        if added {
            if let Err(undo) = unregister() {
                tracing::warn!(error = %undo, "failed to drop key index entry after write error");
            }
        }
        return Err(e);
    }
    Ok(())
}

fn map_error(err: keyring::Error) -> KeyringError {
    match err {
        keyring::Error::NoEntry => KeyringError::KeyNotFound,
        keyring::Error::NoStorageAccess(e) => KeyringError::AccessDenied(e.to_string()),
        keyring::Error::PlatformFailure(e) => KeyringError::from_platform_message(e.to_string()),
        other => KeyringError::Backend(other.to_string()),
    }
}
