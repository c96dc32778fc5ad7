pub mod echoes;
