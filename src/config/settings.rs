use std::path::PathBuf;

pub const PROFILE_ENV: &str = "ASC_PROFILE";
pub const BYPASS_KEYCHAIN_ENV: &str = "ASC_BYPASS_KEYCHAIN";
pub const STRICT_AUTH_ENV: &str = "ASC_STRICT_AUTH";
pub const KEY_ID_ENV: &str = "ASC_KEY_ID";
pub const ISSUER_ID_ENV: &str = "ASC_ISSUER_ID";
pub const PRIVATE_KEY_PATH_ENV: &str = "ASC_PRIVATE_KEY_PATH";
pub const PRIVATE_KEY_B64_ENV: &str = "ASC_PRIVATE_KEY_B64";
pub const PRIVATE_KEY_ENV: &str = "ASC_PRIVATE_KEY";
pub const CONFIG_PATH_ENV: &str = "ASC_CONFIG_PATH";

/// Authentication settings captured once from the environment.
///
/// Everything below the CLI layer receives this value instead of reading
/// process environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSettings {
    pub profile: Option<String>,
    pub bypass_keychain: bool,
    pub strict_auth: bool,
    pub key_id: Option<String>,
    pub issuer_id: Option<String>,
    pub private_key_path: Option<String>,
    pub private_key_b64: Option<String>,
    pub private_key: Option<String>,
    pub config_path: Option<PathBuf>,
}

impl AuthSettings {
    /// Read settings from the process environment, printing a warning for
    /// every switch value that is not recognized.
    pub fn from_env() -> Self {
        let (settings, warnings) = Self::from_lookup(|name| std::env::var(name).ok());
        for warning in &warnings {
            crate::cli::output::warning(warning);
        }
        settings
    }

    /// Build settings from an arbitrary variable lookup.
    ///
    /// Returns the settings together with warnings for unrecognized switch
    /// values; those switches are treated as off.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut warnings = Vec::new();
        let mut switch = |name: &str| {
            let (enabled, warning) = switch_value(name, lookup(name).as_deref());
            warnings.extend(warning);
            enabled
        };
        let bypass_keychain = switch(BYPASS_KEYCHAIN_ENV);
        let strict_auth = switch(STRICT_AUTH_ENV);

        let settings = Self {
            profile: value(PROFILE_ENV),
            bypass_keychain,
            strict_auth,
            key_id: value(KEY_ID_ENV),
            issuer_id: value(ISSUER_ID_ENV),
            private_key_path: value(PRIVATE_KEY_PATH_ENV),
            private_key_b64: value(PRIVATE_KEY_B64_ENV),
            private_key: value(PRIVATE_KEY_ENV),
            config_path: value(CONFIG_PATH_ENV).map(PathBuf::from),
        };
        (settings, warnings)
    }

    /// True when any key material override is set.
    pub fn has_env_key_material(&self) -> bool {
        self.private_key_path.is_some() || self.private_key_b64.is_some() || self.private_key.is_some()
    }

    /// True when any credential override is set.
    pub fn has_env_credentials(&self) -> bool {
        self.key_id.is_some() || self.issuer_id.is_some() || self.has_env_key_material()
    }

    /// True when key ID, issuer ID and key material all come from the environment.
    pub fn has_complete_env_credentials(&self) -> bool {
        self.key_id.is_some() && self.issuer_id.is_some() && self.has_env_key_material()
    }
}

/// Parse a boolean switch value.
///
/// Case-insensitive and whitespace-trimmed. Returns `None` for values that
/// are neither truthy (`1`, `true`, `yes`, `y`, `on`) nor falsey
/// (`0`, `false`, `no`, `n`, `off`, empty).
pub fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Resolve a switch variable, returning its value and a warning when the
/// value was not recognized.
pub fn switch_value(name: &str, raw: Option<&str>) -> (bool, Option<String>) {
    let Some(raw) = raw else {
        return (false, None);
    };
    match parse_switch(raw) {
        Some(enabled) => (enabled, None),
        None => (
            false,
            Some(format!(
                "invalid {name} value {raw:?} (expected 1/0, true/false, yes/no, on/off); treating as false"
            )),
        ),
    }
}
