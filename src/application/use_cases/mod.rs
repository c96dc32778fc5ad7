pub mod auth;
pub mod echoes;
pub mod profile;
