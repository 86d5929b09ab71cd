pub mod config;
pub mod core;
pub mod handler;
pub mod models;
pub mod plugins;
pub mod scheduler;
pub mod utils;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::handler::{CheckReport, Handler, InvocationResponse};
pub use crate::utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
