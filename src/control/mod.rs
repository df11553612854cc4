//! Command messages and the bounded queue feeding the command loop
//!
//! All externally requested mutations go through here so that a single
//! consumer applies them in submission order.

pub mod command;
pub mod queue;

// Re-export main types
pub use command::{Command, Operation, Reply, TimerCommand};
pub use queue::{CommandQueue, QueueSettings};
