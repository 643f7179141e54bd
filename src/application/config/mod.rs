pub mod cli_args;
pub mod data_directory;
pub mod network;
pub mod vault_config;
