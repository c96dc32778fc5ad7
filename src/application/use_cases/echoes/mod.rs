pub mod create_comment;
pub mod create_echo;
pub mod list_echoes;
pub mod toggle_like;
