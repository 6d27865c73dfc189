pub mod cli;
pub mod load_config;
pub mod shell;

pub use cli::{run, Cli, Commands};
