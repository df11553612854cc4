//! Command value objects

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::{error::Result, state::{Timer, TimerMode}};

/// Optional acknowledgment channel, signalled once the command has been applied
pub type Reply = oneshot::Sender<Result<()>>;

/// Per-timer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start(TimerMode),
    Pause,
    Resume,
    Reset,
    SetCustomDuration(u32),
}

#[derive(Debug)]
pub struct TimerCommand {
    pub operation: Operation,
    pub target: Arc<Timer>,
    pub reply: Option<Reply>,
}

/// A queued mutation, consumed once by the command loop
#[derive(Debug)]
pub enum Command {
    Timer(TimerCommand),
    /// Turbo reconfiguration across all timers, applied as one unit
    Turbo { enable: bool, reply: Option<Reply> },
}

impl Command {
    pub fn new(operation: Operation, target: Arc<Timer>) -> Self {
        Command::Timer(TimerCommand { operation, target, reply: None })
    }

    /// Create a command together with the receiver for its acknowledgment
    pub fn with_reply(operation: Operation, target: Arc<Timer>) -> (Self, oneshot::Receiver<Result<()>>) {
        let (tx, rx) = oneshot::channel();
        (Command::Timer(TimerCommand { operation, target, reply: Some(tx) }), rx)
    }

    pub fn turbo(enable: bool) -> (Self, oneshot::Receiver<Result<()>>) {
        let (tx, rx) = oneshot::channel();
        (Command::Turbo { enable, reply: Some(tx) }, rx)
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Command::Timer(cmd) => format!("{:?} on {}", cmd.operation, cmd.target.name()),
            Command::Turbo { enable, .. } => format!("Turbo({})", enable),
        }
    }
}
