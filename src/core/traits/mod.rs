pub mod credential_lookup;
pub mod keyring;
