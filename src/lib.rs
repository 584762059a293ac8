pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod message;

pub use error::{AutoAtError, Result};
