//! D2Timers - A multi-timer countdown service
//! 
//! This library provides a fixed set of named timers with auto and manual
//! drive modes, optional turbo durations and one user-configurable timer.
//! All mutations are serialized through a single command loop while a
//! ticker advances active timers once per second and raises one alert per
//! tick, chosen by priority.

pub mod config;
pub mod error;
pub mod state;
pub mod control;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
