//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::control::QueueSettings;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "d2timers")]
#[command(about = "A multi-timer countdown service with prioritized alerts")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// JSON file with the timer definitions
    #[arg(short, long, default_value = "assets/timers_config.json")]
    pub timers: PathBuf,

    /// Command queue capacity
    #[arg(long, default_value = "256")]
    pub queue_capacity: usize,

    /// How long a submission waits for queue space before it is dropped
    #[arg(long, default_value = "150")]
    pub submit_timeout_ms: u64,

    /// How long callers wait for a command acknowledgment
    #[arg(long, default_value = "200")]
    pub ack_timeout_ms: u64,

    /// External program used to play alert sounds (alerts are only logged if unset)
    #[arg(long)]
    pub player: Option<String>,

    /// Directory alert sounds are resolved against
    #[arg(long, default_value = "assets")]
    pub sounds_dir: PathBuf,

    /// Start with turbo durations enabled
    #[arg(long)]
    pub turbo: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Queue sizing and timeouts for the command loop
    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings {
            capacity: self.queue_capacity,
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
            ack_timeout: Duration::from_millis(self.ack_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["d2timers"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");

        let settings = config.queue_settings();
        assert_eq!(settings.capacity, 256);
        assert_eq!(settings.submit_timeout, Duration::from_millis(150));
        assert_eq!(settings.ack_timeout, Duration::from_millis(200));
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "d2timers",
            "--player",
            "paplay",
            "--queue-capacity",
            "8",
            "--turbo",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.player.as_deref(), Some("paplay"));
        assert_eq!(config.queue_settings().capacity, 8);
        assert!(config.turbo);
        assert_eq!(config.log_level(), "debug");
    }
}
