//! Command loop background task
//!
//! The only consumer of the command queue. Commands are applied one at a
//! time, to completion, in arrival order. Cancellation is only observed
//! between commands.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    control::{Command, Operation, Reply, TimerCommand},
    error::{Result, TimerError},
    state::AppState,
};

/// Drain the command queue until cancelled
pub async fn command_loop_task(
    state: Arc<AppState>,
    mut commands: mpsc::Receiver<Command>,
    cancel: CancellationToken,
) {
    info!("Starting command loop");

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                info!("Command loop cancelled");
                break;
            }

            command = commands.recv() => match command {
                Some(command) => apply_command(&state, command),
                None => {
                    info!("Command queue closed");
                    break;
                }
            }
        }
    }
}

/// Apply one command synchronously, then acknowledge and request a refresh
pub fn apply_command(state: &AppState, command: Command) {
    let action = command.describe();
    debug!("Applying {}", action);

    match command {
        Command::Timer(TimerCommand { operation, target, reply }) => {
            let registry = state.registry();
            // Ok(false) marks a command that was valid but changed nothing
            let result = match operation {
                Operation::Start(mode) => {
                    if target.start(registry, mode) {
                        Ok(true)
                    } else {
                        Err(TimerError::InvalidPrecondition(format!(
                            "{} needs a duration before it can start",
                            target.name()
                        )))
                    }
                }
                Operation::Pause => Ok(target.pause(registry)),
                Operation::Resume => Ok(target.resume(registry)),
                Operation::Reset => {
                    target.reset(registry);
                    Ok(true)
                }
                Operation::SetCustomDuration(seconds) => target.set_custom_duration(seconds).map(|()| true),
            };

            match &result {
                Ok(true) => state.record_action(&action),
                Ok(false) => debug!("{} ignored in state {:?}", action, target.state()),
                Err(e) => warn!("{} rejected: {}", action, e),
            }
            let result = result.map(|_| ());
            state.notify_refresh(&target);
            acknowledge(reply, result);
        }
        Command::Turbo { enable, reply } => {
            let result = state.turbo().reconfigure(state.timers(), enable);

            match &result {
                Ok(()) => {
                    state.record_action(&action);
                    state.notify_turbo(enable);
                    state.notify_refresh_all();
                }
                Err(e) => warn!("{} rejected: {}", action, e),
            }
            acknowledge(reply, result);
        }
    }
}

/// Best-effort acknowledgment; nobody listening is fine
fn acknowledge(reply: Option<Reply>, result: Result<()>) {
    if let Some(reply) = reply {
        if reply.send(result).is_err() {
            debug!("Acknowledgment dropped, caller stopped waiting");
        }
    }
}
