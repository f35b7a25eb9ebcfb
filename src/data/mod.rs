//! Read-only definition tables: bosses, inscriptions, difficulty scaling.

pub mod bosses;
pub mod difficulty;
pub mod inscriptions;

pub use bosses::*;
pub use difficulty::*;
pub use inscriptions::*;
