pub mod arena;
pub mod config;
pub mod error;
pub mod types;

pub use arena::{Arena, EntityRegistry};
pub use config::CommanderConfig;
pub use error::{CommanderError, Result};
