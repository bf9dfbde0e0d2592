pub mod auth_config;
pub mod token_provider;
