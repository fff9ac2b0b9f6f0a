//! Generated configuration files

pub mod env_file;

pub use env_file::{write_env_file, DatabaseSettings, ENV_FILE_NAME, ROOT_USER};
