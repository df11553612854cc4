//! Background tasks module
//! 
//! This module contains the two long-running loops: the command loop that
//! serializes mutations and the ticker that advances active timers.

pub mod command_loop;
pub mod ticker;

// Re-export main functions
pub use command_loop::{apply_command, command_loop_task};
pub use ticker::{run_ticker, tick_once, ticker_task, TICK_PERIOD};
