pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::ModelError;
pub use models::*;
