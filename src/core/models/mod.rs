pub mod credential;
pub mod credential_sources;
pub mod payload;
