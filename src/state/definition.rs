//! Static timer definitions, loaded once at startup

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TimerError};

/// A (initial, repeat) duration pair in seconds. A zero pair means "not defined".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationPair {
    pub initial: u32,
    pub repeat: u32,
}

impl DurationPair {
    pub fn new(initial: u32, repeat: u32) -> Self {
        Self { initial, repeat }
    }

    /// Check if neither value is set
    pub fn is_zero(&self) -> bool {
        self.initial == 0 && self.repeat == 0
    }
}

/// Immutable configuration for one timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerDefinition {
    pub name: String,
    /// Opaque sound identifier handed to the alert sink
    pub sound: String,
    #[serde(default)]
    pub background: Option<String>,
    /// Higher value wins when several timers expire in the same tick
    #[serde(default)]
    pub priority: i32,
    /// The user-configurable timer; its duration is supplied at runtime
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub normal_auto: DurationPair,
    #[serde(default)]
    pub normal_manual: DurationPair,
    #[serde(default)]
    pub turbo_auto: DurationPair,
    #[serde(default)]
    pub turbo_manual: DurationPair,
}

impl TimerDefinition {
    /// Create a preset definition with the given normal durations
    pub fn preset(name: &str, sound: &str, priority: i32, auto: DurationPair, manual: DurationPair) -> Self {
        Self {
            name: name.to_string(),
            sound: sound.to_string(),
            background: None,
            priority,
            custom: false,
            normal_auto: auto,
            normal_manual: manual,
            turbo_auto: DurationPair::default(),
            turbo_manual: DurationPair::default(),
        }
    }

    /// Create the user-configurable definition
    pub fn custom(name: &str, sound: &str, priority: i32) -> Self {
        Self {
            custom: true,
            ..Self::preset(name, sound, priority, DurationPair::default(), DurationPair::default())
        }
    }

    /// Check that none of the four duration pairs is set
    pub fn has_no_durations(&self) -> bool {
        [self.normal_auto, self.normal_manual, self.turbo_auto, self.turbo_manual]
            .iter()
            .all(DurationPair::is_zero)
    }

    pub fn with_turbo(mut self, auto: DurationPair, manual: DurationPair) -> Self {
        self.turbo_auto = auto;
        self.turbo_manual = manual;
        self
    }
}

/// Parse and validate definitions from a JSON document
pub fn parse_definitions(json: &str) -> Result<Vec<TimerDefinition>> {
    let definitions: Vec<TimerDefinition> = serde_json::from_str(json)?;
    validate_definitions(&definitions)?;
    Ok(definitions)
}

/// Load definitions from a JSON file
pub fn load_definitions(path: &Path) -> Result<Vec<TimerDefinition>> {
    let data = std::fs::read_to_string(path)?;
    let definitions = parse_definitions(&data)?;
    info!("Loaded {} timer definitions from {}", definitions.len(), path.display());
    Ok(definitions)
}

/// Check names are unique, at most one custom timer exists and it carries no durations
pub fn validate_definitions(definitions: &[TimerDefinition]) -> Result<()> {
    if definitions.is_empty() {
        return Err(TimerError::InvalidDefinitions("no timers defined".to_string()));
    }

    let mut names = HashSet::new();
    for definition in definitions {
        if definition.name.trim().is_empty() {
            return Err(TimerError::InvalidDefinitions("timer name must not be empty".to_string()));
        }
        if !names.insert(definition.name.as_str()) {
            return Err(TimerError::InvalidDefinitions(format!(
                "duplicate timer name: {}",
                definition.name
            )));
        }
        if definition.custom && !definition.has_no_durations() {
            return Err(TimerError::InvalidDefinitions(format!(
                "custom timer {} must not define durations",
                definition.name
            )));
        }
    }

    let custom_count = definitions.iter().filter(|d| d.custom).count();
    if custom_count > 1 {
        return Err(TimerError::InvalidDefinitions(format!(
            "expected at most one custom timer, found {}",
            custom_count
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "name": "Power Runes",
            "sound": "audio_timer2.ogg",
            "priority": 9,
            "normal_auto": { "initial": 120, "repeat": 120 },
            "normal_manual": { "initial": 110, "repeat": 120 },
            "turbo_auto": { "initial": 60, "repeat": 60 }
        },
        { "name": "Custom Timer", "sound": "audio_timer4.ogg", "custom": true }
    ]"#;

    #[test]
    fn test_parse_definitions_with_defaults() {
        let definitions = parse_definitions(SAMPLE).unwrap();
        assert_eq!(definitions.len(), 2);

        let runes = &definitions[0];
        assert_eq!(runes.normal_manual, DurationPair::new(110, 120));
        assert_eq!(runes.turbo_auto, DurationPair::new(60, 60));
        assert!(runes.turbo_manual.is_zero());
        assert!(!runes.custom);

        let custom = &definitions[1];
        assert!(custom.custom);
        assert_eq!(custom.priority, 0);
        assert!(custom.normal_auto.is_zero());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let json = r#"[
            { "name": "A", "sound": "a.ogg" },
            { "name": "A", "sound": "b.ogg" }
        ]"#;
        assert!(matches!(parse_definitions(json), Err(TimerError::InvalidDefinitions(_))));
    }

    #[test]
    fn test_two_custom_timers_rejected() {
        let json = r#"[
            { "name": "A", "sound": "a.ogg", "custom": true },
            { "name": "B", "sound": "b.ogg", "custom": true }
        ]"#;
        assert!(matches!(parse_definitions(json), Err(TimerError::InvalidDefinitions(_))));
    }

    #[test]
    fn test_custom_timer_with_durations_rejected() {
        let json = r#"[
            {
                "name": "Custom Timer",
                "sound": "a.ogg",
                "custom": true,
                "turbo_manual": { "initial": 30, "repeat": 0 }
            }
        ]"#;
        assert!(matches!(parse_definitions(json), Err(TimerError::InvalidDefinitions(_))));

        let json = r#"[
            {
                "name": "Custom Timer",
                "sound": "a.ogg",
                "custom": true,
                "normal_auto": { "initial": 60, "repeat": 60 }
            }
        ]"#;
        assert!(matches!(parse_definitions(json), Err(TimerError::InvalidDefinitions(_))));
    }

    #[test]
    fn test_empty_and_malformed_rejected() {
        assert!(matches!(parse_definitions("[]"), Err(TimerError::InvalidDefinitions(_))));
        assert!(matches!(parse_definitions("{ not json"), Err(TimerError::Json(_))));
    }

    #[test]
    fn test_load_definitions_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let definitions = load_definitions(file.path()).unwrap();
        assert_eq!(definitions[0].name, "Power Runes");

        let missing = load_definitions(Path::new("/nonexistent/timers.json"));
        assert!(matches!(missing, Err(TimerError::Io(_))));
    }
}
