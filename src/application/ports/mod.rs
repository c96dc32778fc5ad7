pub mod echo_repository;
pub mod storage_port;
pub mod user_repository;
