//! Bounded command queue with timeout-then-drop submission
//!
//! A full queue makes the caller wait for a short, fixed time. If no space
//! frees up the command is dropped and logged; there is no retry. Callers
//! that need to know the outcome wait for the acknowledgment with their own
//! timeout and re-read snapshots when it does not arrive.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tracing::warn;

use super::Command;

/// Queue sizing and timing
#[derive(Debug, Clone, Copy)]
pub struct QueueSettings {
    pub capacity: usize,
    /// How long `submit` waits for space before dropping
    pub submit_timeout: Duration,
    /// How long callers wait for an acknowledgment
    pub ack_timeout: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: 256,
            submit_timeout: Duration::from_millis(150),
            ack_timeout: Duration::from_millis(200),
        }
    }
}

/// Producer side of the command queue; cheap to clone
#[derive(Debug, Clone)]
pub struct CommandQueue {
    tx: mpsc::Sender<Command>,
    submit_timeout: Duration,
}

impl CommandQueue {
    /// Create the queue and the receiver the command loop drains
    pub fn new(settings: &QueueSettings) -> (Self, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(settings.capacity.max(1));
        (
            Self {
                tx,
                submit_timeout: settings.submit_timeout,
            },
            rx,
        )
    }

    /// Enqueue a command. Returns false if it was dropped.
    pub async fn submit(&self, command: Command) -> bool {
        match self.tx.send_timeout(command, self.submit_timeout).await {
            Ok(()) => true,
            Err(SendTimeoutError::Timeout(command)) => {
                warn!(
                    "Command queue full for {:?}, dropping {}",
                    self.submit_timeout,
                    command.describe()
                );
                false
            }
            Err(SendTimeoutError::Closed(command)) => {
                warn!("Command loop stopped, dropping {}", command.describe());
                false
            }
        }
    }
}
