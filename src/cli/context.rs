use crate::adapters::keyring::os_keyring::OsKeyringOpener;
use crate::cli::Cli;
use crate::config::paths::ConfigPaths;
use crate::config::settings::AuthSettings;
use crate::core::services::credential_resolver::CredentialResolver;

/// Per-invocation state shared by the auth commands.
///
/// Environment settings are read once here; command-line flags override them.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AuthSettings,
    pub verbose: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut settings = AuthSettings::from_env();
        if let Some(profile) = cli.profile.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            settings.profile = Some(profile.to_string());
        }
        if cli.strict_auth {
            settings.strict_auth = true;
        }
        Self {
            settings,
            verbose: cli.verbose,
        }
    }

    pub fn paths(&self) -> ConfigPaths {
        ConfigPaths::discover(self.settings.config_path.clone())
    }

    pub fn resolver(&self) -> CredentialResolver<OsKeyringOpener> {
        CredentialResolver::new(
            OsKeyringOpener::new(),
            self.paths(),
            self.settings.bypass_keychain,
        )
    }
}
