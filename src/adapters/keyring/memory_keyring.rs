//! In-memory keyring doubles for unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::core::traits::keyring::{Keyring, KeyringError, KeyringOpener, Namespace};

/// Keyring backed by a shared map. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyring {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Keyring for MemoryKeyring {
    fn get(&self, key: &str) -> Result<String, KeyringError> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(KeyringError::KeyNotFound)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyringError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KeyringError> {
        self.entries
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or(KeyringError::KeyNotFound)
    }

    fn keys(&self) -> Result<Vec<String>, KeyringError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

/// Keyring that opens fine but fails every operation.
#[derive(Debug, Clone)]
pub struct FailingKeyring {
    error: KeyringError,
}

impl Keyring for FailingKeyring {
    fn get(&self, _key: &str) -> Result<String, KeyringError> {
        Err(self.error.clone())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), KeyringError> {
        Err(self.error.clone())
    }

    fn remove(&self, _key: &str) -> Result<(), KeyringError> {
        Err(self.error.clone())
    }

    fn keys(&self) -> Result<Vec<String>, KeyringError> {
        Err(self.error.clone())
    }
}

/// What opening one namespace produces.
#[derive(Debug, Clone)]
pub enum Slot {
    Memory(MemoryKeyring),
    /// Opens, then every operation fails with this error.
    Failing(KeyringError),
    /// Opening fails with this error.
    Unopenable(KeyringError),
}

impl Slot {
    fn open(&self) -> Result<Box<dyn Keyring>, KeyringError> {
        match self {
            Slot::Memory(kr) => Ok(Box::new(kr.clone())),
            Slot::Failing(error) => Ok(Box::new(FailingKeyring {
                error: error.clone(),
            })),
            Slot::Unopenable(error) => Err(error.clone()),
        }
    }
}

/// Opener handing out one slot per namespace.
#[derive(Debug, Clone)]
pub struct MemoryKeyringOpener {
    current: Slot,
    legacy: Slot,
}

impl MemoryKeyringOpener {
    pub fn new(current: Slot, legacy: Slot) -> Self {
        Self { current, legacy }
    }

    /// Two independent stores; returns handles for inspecting them.
    pub fn separate() -> (Self, MemoryKeyring, MemoryKeyring) {
        let current = MemoryKeyring::new();
        let legacy = MemoryKeyring::new();
        let opener = Self::new(Slot::Memory(current.clone()), Slot::Memory(legacy.clone()));
        (opener, current, legacy)
    }

    /// No keyring implementation at all.
    pub fn unavailable() -> Self {
        Self::new(
            Slot::Unopenable(KeyringError::NoAvailImpl),
            Slot::Unopenable(KeyringError::NoAvailImpl),
        )
    }
}

impl KeyringOpener for MemoryKeyringOpener {
    fn open(&self, namespace: Namespace) -> Result<Box<dyn Keyring>, KeyringError> {
        match namespace {
            Namespace::Current => self.current.open(),
            Namespace::Legacy => self.legacy.open(),
        }
    }
}
