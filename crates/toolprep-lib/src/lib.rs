pub mod catalog;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod install;
pub mod launcher;
pub mod packages;
pub mod privileged;
pub mod resolver;
pub mod utils;
pub mod verification;

pub use config::Config;
pub use error::ToolPrepError;
