pub mod auth_config;
pub mod paths;
pub mod settings;
