use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::core::models::credential::{Credential, CredentialSource, PrivateKeyPem};

/// Prefix for credential entries in a keyring namespace.
const KEY_PREFIX: &str = "asc:credential:";

/// Keyring entry name for a profile.
pub fn keyring_key(name: &str) -> String {
    format!("{KEY_PREFIX}{name}")
}

/// Profile name for a keyring entry, or `None` for entries that are not credentials.
pub fn credential_name(key: &str) -> Option<&str> {
    key.strip_prefix(KEY_PREFIX).filter(|name| !name.is_empty())
}

/// JSON value stored in a keyring entry.
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayload {
    #[serde(default)]
    pub key_id: String,
    #[serde(default)]
    pub issuer_id: String,
    #[serde(default)]
    pub private_key_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key_pem: String,
}

impl Drop for CredentialPayload {
    fn drop(&mut self) {
        self.private_key_pem.zeroize();
    }
}

impl CredentialPayload {
    pub fn from_credential(cred: &Credential) -> Self {
        Self {
            key_id: cred.key_id.clone(),
            issuer_id: cred.issuer_id.clone(),
            private_key_path: cred.private_key_path.clone(),
            private_key_pem: cred
                .private_key_pem
                .as_ref()
                .map(|pem| pem.expose().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Build the keychain-sourced credential named `name`.
    pub fn to_credential(&self, name: &str) -> Credential {
        let mut cred = Credential::new(name, &self.key_id, &self.issuer_id, &self.private_key_path);
        cred.private_key_pem = PrivateKeyPem::new(self.private_key_pem.as_str());
        cred.source = Some(CredentialSource::Keychain);
        cred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_round_trip_through_prefix() {
        assert_eq!(keyring_key("my-key"), "asc:credential:my-key");
        assert_eq!(credential_name("asc:credential:my-key"), Some("my-key"));
        assert_eq!(credential_name("asc:credential:"), None);
        assert_eq!(credential_name("__asc_index__"), None);
    }

    #[test]
    fn payload_uses_camel_case_fields() {
        let mut cred = Credential::new("ci", "KEY", "ISS", "/tmp/k.p8");
        cred.private_key_pem = PrivateKeyPem::new("PEM");
        let json = CredentialPayload::from_credential(&cred).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["keyId"], "KEY");
        assert_eq!(value["issuerId"], "ISS");
        assert_eq!(value["privateKeyPath"], "/tmp/k.p8");
        assert_eq!(value["privateKeyPem"], "PEM");
    }

    #[test]
    fn payload_without_pem_is_accepted() {
        let payload =
            CredentialPayload::from_json(r#"{"keyId":"K","issuerId":"I","privateKeyPath":"/p"}"#)
                .unwrap();
        let cred = payload.to_credential("old");
        assert_eq!(cred.private_key_pem, None);
        assert_eq!(cred.source, Some(CredentialSource::Keychain));
        assert_eq!(cred.private_key_path, "/p");
    }
}
