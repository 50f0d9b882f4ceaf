pub mod access_guard;
pub mod credential_chain;
pub mod credential_resolver;
pub mod key_material;
pub mod migration;
