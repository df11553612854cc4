//! External collaborator module
//! 
//! This module contains the alert capability the core calls out to and the
//! system probes used at startup.

pub mod alerts;
pub mod system;

// Re-export main types and functions
pub use alerts::{AlertSink, CommandAlertSink, LogAlertSink};
pub use system::check_player_available;
