use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// The two secret-store buckets credentials can live in.
///
/// Entries are only ever written to `Current`; `Legacy` is read so that
/// entries written by older releases can be migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Current,
    Legacy,
}

impl Namespace {
    /// Service name identifying this bucket in the OS secret store.
    pub fn service_name(&self) -> &'static str {
        match self {
            Namespace::Current => "asc",
            Namespace::Legacy => "asc-cli",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Current => f.write_str("current"),
            Namespace::Legacy => f.write_str("legacy"),
        }
    }
}

/// Failures reported by a secret-store backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyringError {
    /// No secret-store integration exists for this platform or session.
    #[error("no keyring implementation available")]
    NoAvailImpl,

    #[error("the specified item could not be found in the keyring")]
    KeyNotFound,

    /// The OS refused authorization (locked store, declined prompt).
    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    Backend(String),
}

/// Phrasings OS secret stores use when they refuse authorization.
///
/// macOS reports OSStatus codes (`-25293` errSecAuthFailed, `-25308`
/// errSecInteractionNotAllowed, `-128` userCanceled) inside free text; the
/// Secret Service and Windows report plain sentences.
const DENIAL_PATTERNS: &[&str] = &[
    r"\(-25293\)",
    r"\(-25308\)",
    r"\(-128\)",
    r"errSecAuthFailed",
    r"errSecInteractionNotAllowed",
    r"user name or passphrase you entered is not correct",
    r"user interaction is not allowed",
    r"authori[sz]ation (was )?denied",
    r"not authori[sz]ed",
    r"access is denied",
    r"prompt (was )?dismissed",
    r"user canceled the operation",
];

static DENIAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!("(?i){}", DENIAL_PATTERNS.join("|"))).ok());

impl KeyringError {
    /// Classify a free-text platform failure.
    ///
    /// Last resort for bindings that only surface stringified OS errors:
    /// known denial phrasings become `AccessDenied`, anything else `Backend`.
    pub fn from_platform_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_denial_message(&message) {
            KeyringError::AccessDenied(message)
        } else {
            KeyringError::Backend(message)
        }
    }
}

/// Whether `message` matches a known OS authorization-denial phrasing.
pub fn is_denial_message(message: &str) -> bool {
    DENIAL.as_ref().is_some_and(|re| re.is_match(message))
}

/// Port for one namespace of an OS-native secret store.
///
/// Values are opaque strings; the resolver stores JSON payloads in them.
pub trait Keyring: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<String, KeyringError>;

    /// Create or overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), KeyringError>;

    /// Delete `key`. Fails with `KeyNotFound` when it does not exist.
    fn remove(&self, key: &str) -> Result<(), KeyringError>;

    /// All keys present in this namespace.
    fn keys(&self) -> Result<Vec<String>, KeyringError>;
}

/// Capability to open a namespace of the secret store.
///
/// Production code uses the OS keyring; tests pass in-memory doubles.
pub trait KeyringOpener: Send + Sync {
    fn open(&self, namespace: Namespace) -> Result<Box<dyn Keyring>, KeyringError>;
}
