use crate::core::errors::Result;
use crate::core::models::credential::{Credential, CredentialSource};

/// Port for looking up stored credentials by profile name.
///
/// An empty `name` selects the default profile.
pub trait CredentialLookup {
    fn get_credentials_with_source(&self, name: &str) -> Result<(Credential, CredentialSource)>;

    #[cfg(test)]
    fn get_credentials(&self, name: &str) -> Result<Credential> {
        self.get_credentials_with_source(name).map(|(cred, _)| cred)
    }
}
