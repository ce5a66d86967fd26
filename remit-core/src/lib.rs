//! Remit Core - shared building blocks of the Remit admin client
//!
//! Error handling, logging bootstrap, TOML configuration and the capability traits
//! through which the session lifecycle reaches the UI and storage layers.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
