//! Constants, configuration and error types shared by the battle engine.

pub mod config;
pub mod constants;
pub mod error;

pub use config::BattleConfig;
pub use constants::*;
pub use error::{BattleError, CatalogError};
