//! Core application infrastructure

pub(crate) mod banner;
pub mod cli;
pub mod config;
pub mod constants;
pub mod replying;
pub mod shutdown;
pub mod storage;

pub use crate::app::CoreApp;
pub use cli::CliConfig;
pub use config::{AppConfig, OrphanPolicy, OtelConfig, ServerConfig, StorageConfig};
pub use replying::ReplyingState;
pub use shutdown::ShutdownService;
pub use storage::{AppStorage, DataSubdir};
