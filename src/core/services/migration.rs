use std::collections::BTreeSet;

use crate::core::models::payload::credential_name;
use crate::core::traits::keyring::{Keyring, KeyringError};

/// What one migration pass will do to the legacy namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Legacy entries with no current counterpart, moved into the current namespace.
    pub copies: Vec<String>,
    /// Legacy entries already present in the current namespace, deleted without copying.
    pub duplicates: Vec<String>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty() && self.duplicates.is_empty()
    }
}

/// Decide how to drain the legacy namespace.
///
/// Only credential entries are considered. The current namespace always wins
/// on a name collision; fields are never merged.
pub fn plan_migration(current_keys: &[String], legacy_keys: &[String]) -> MigrationPlan {
    let current: BTreeSet<&str> = current_keys.iter().map(String::as_str).collect();
    let mut plan = MigrationPlan::default();
    for key in legacy_keys {
        if credential_name(key).is_none() {
            continue;
        }
        if current.contains(key.as_str()) {
            plan.duplicates.push(key.clone());
        } else {
            plan.copies.push(key.clone());
        }
    }
    plan
}

/// Carry out `plan`. A legacy entry is deleted only after its copy succeeded.
///
/// Returns the number of entries moved.
pub fn apply_migration(
    plan: &MigrationPlan,
    current: &dyn Keyring,
    legacy: &dyn Keyring,
) -> Result<usize, KeyringError> {
    let mut moved = 0;
    for key in &plan.copies {
        let value = match legacy.get(key) {
            Ok(value) => value,
            Err(KeyringError::KeyNotFound) => continue,
            Err(e) => return Err(e),
        };
        current.set(key, &value)?;
        remove_if_present(legacy, key)?;
        moved += 1;
        tracing::debug!(key = %key, "migrated legacy keychain entry");
    }
    for key in &plan.duplicates {
        remove_if_present(legacy, key)?;
        tracing::debug!(key = %key, "removed duplicate legacy keychain entry");
    }
    Ok(moved)
}

/// Plan and apply one migration pass between two opened namespaces.
pub fn migrate(current: &dyn Keyring, legacy: &dyn Keyring) -> Result<usize, KeyringError> {
    let legacy_keys = legacy.keys()?;
    if legacy_keys.is_empty() {
        return Ok(0);
    }
    let plan = plan_migration(&current.keys()?, &legacy_keys);
    if plan.is_empty() {
        return Ok(0);
    }
    apply_migration(&plan, current, legacy)
}

fn remove_if_present(keyring: &dyn Keyring, key: &str) -> Result<(), KeyringError> {
    match keyring.remove(key) {
        Ok(()) | Err(KeyringError::KeyNotFound) => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::keyring::memory_keyring::MemoryKeyring;
    use crate::core::models::payload::keyring_key;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| keyring_key(n)).collect()
    }

    #[test]
    fn plan_moves_legacy_only_and_drops_duplicates() {
        let plan = plan_migration(&keys(&["shared", "new"]), &keys(&["shared", "old"]));
        assert_eq!(plan.copies, keys(&["old"]));
        assert_eq!(plan.duplicates, keys(&["shared"]));
    }

    #[test]
    fn plan_ignores_foreign_entries() {
        let legacy = vec!["__asc_index__".to_string(), "something-else".to_string()];
        assert!(plan_migration(&[], &legacy).is_empty());
    }

    #[test]
    fn migrate_moves_entries_and_empties_legacy() {
        let current = MemoryKeyring::new();
        let legacy = MemoryKeyring::new();
        current.set(&keyring_key("shared"), "current-value").unwrap();
        legacy.set(&keyring_key("shared"), "legacy-value").unwrap();
        legacy.set(&keyring_key("old"), "old-value").unwrap();

        let moved = migrate(&current, &legacy).unwrap();

        assert_eq!(moved, 1);
        assert_eq!(legacy.len(), 0);
        assert_eq!(current.get(&keyring_key("old")).unwrap(), "old-value");
        assert_eq!(current.get(&keyring_key("shared")).unwrap(), "current-value");
    }

    #[test]
    fn migrate_is_idempotent() {
        let current = MemoryKeyring::new();
        let legacy = MemoryKeyring::new();
        legacy.set(&keyring_key("old"), "old-value").unwrap();

        assert_eq!(migrate(&current, &legacy).unwrap(), 1);
        assert_eq!(migrate(&current, &legacy).unwrap(), 0);
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn failed_copy_keeps_legacy_entry() {
        struct ReadOnly(MemoryKeyring);
        impl Keyring for ReadOnly {
            fn get(&self, key: &str) -> Result<String, KeyringError> {
                self.0.get(key)
            }
            fn set(&self, _key: &str, _value: &str) -> Result<(), KeyringError> {
                Err(KeyringError::Backend("read-only".into()))
            }
            fn remove(&self, key: &str) -> Result<(), KeyringError> {
                self.0.remove(key)
            }
            fn keys(&self) -> Result<Vec<String>, KeyringError> {
                self.0.keys()
            }
        }

        let current = ReadOnly(MemoryKeyring::new());
        let legacy = MemoryKeyring::new();
        legacy.set(&keyring_key("old"), "old-value").unwrap();

        assert!(migrate(&current, &legacy).is_err());
        assert_eq!(legacy.get(&keyring_key("old")).unwrap(), "old-value");
    }
}
