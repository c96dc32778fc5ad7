pub mod media;
pub mod threads;
pub mod tokens;
