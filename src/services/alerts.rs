//! Alert playback collaborators
//!
//! The ticker calls [`AlertSink::play_sound`] with an opaque sound
//! identifier. Implementations must return immediately; playback happens
//! elsewhere.

use std::{fmt::Debug, path::PathBuf};

use tokio::process::Command;
use tracing::{debug, error, info};

/// Capability the core needs from the audio side
pub trait AlertSink: Send + Sync + Debug {
    fn play_sound(&self, sound: &str);
}

/// Logs alerts without playing anything
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn play_sound(&self, sound: &str) {
        info!("Alert sound requested: {}", sound);
    }
}

/// Plays alerts by spawning an external player, e.g. `paplay` or `aplay`
#[derive(Debug, Clone)]
pub struct CommandAlertSink {
    program: String,
    sounds_dir: PathBuf,
}

impl CommandAlertSink {
    pub fn new(program: impl Into<String>, sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            sounds_dir: sounds_dir.into(),
        }
    }

    /// Resolve a sound identifier to a file path
    pub fn sound_path(&self, sound: &str) -> PathBuf {
        self.sounds_dir.join(sound)
    }
}

impl AlertSink for CommandAlertSink {
    fn play_sound(&self, sound: &str) {
        let program = self.program.clone();
        let path = self.sound_path(sound);

        // Fire-and-forget so the ticker is never held up by playback
        tokio::spawn(async move {
            debug!("Playing {} with {}", path.display(), program);

            match Command::new(&program).arg(&path).output().await {
                Ok(output) if output.status.success() => {}
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    error!("{} failed to play {}: {}", program, path.display(), stderr.trim());
                }
                Err(e) => error!("Failed to execute {}: {}", program, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_path_resolves_against_dir() {
        let sink = CommandAlertSink::new("paplay", "assets");
        assert_eq!(sink.sound_path("audio_timer1.ogg"), PathBuf::from("assets/audio_timer1.ogg"));
    }

    #[tokio::test]
    async fn test_missing_player_does_not_panic() {
        let sink = CommandAlertSink::new("definitely-not-a-player-binary", "assets");
        sink.play_sound("audio_timer1.ogg");
        tokio::task::yield_now().await;
    }
}
