//! Sealed Zone - raid-boss battle engine.
//!
//! A ticket-gated boss fight that runs beside the idle loop: per-slot
//! attack timers drive a staged damage pipeline against a boss whose
//! pattern (shield, regeneration, equipment destruction, invincibility)
//! changes the rules mid-fight.

pub mod battle;
pub mod build_info;
pub mod core;
pub mod data;
pub mod host;
pub mod zone;
