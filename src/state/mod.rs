//! State management module
//! 
//! This module contains the timer state machine, the active-timer registry,
//! turbo reconfiguration and the coordinating application state.

pub mod app_state;
pub mod definition;
pub mod registry;
pub mod timer_state;
pub mod turbo;

// Re-export main types
pub use app_state::{AppState, ControlAction, ControlSummary, TimerEvent};
pub use definition::{load_definitions, parse_definitions, DurationPair, TimerDefinition};
pub use registry::ActiveRegistry;
pub use timer_state::{Lifecycle, Timer, TimerMode, TimerSnapshot};
pub use turbo::TurboMode;
