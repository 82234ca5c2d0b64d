//! Scripted game sessions
//!
//! A scenario is a JSON array of timed events:
//!
//! ```json
//! [
//!   { "at_ms": 0,   "event": { "type": "chat_user_added", "id": 5 } },
//!   { "at_ms": 100, "event": { "type": "game_user_added", "id": 5 } }
//! ]
//! ```

use earshot_core::domain::collaborators::GameData;
use earshot_core::domain::event::Event;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Step {index} at {at_ms} ms is earlier than the step before it")]
    OutOfOrder { index: usize, at_ms: u64 },
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Offset from the start of the scenario
    pub at_ms: u64,
    pub event: Event,
}

impl ScenarioStep {
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scenario {
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn new(steps: Vec<ScenarioStep>) -> Result<Self> {
        let scenario = Self { steps };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let scenario = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            steps = scenario.steps.len(),
            "Scenario loaded"
        );
        Ok(scenario)
    }

    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<ScenarioStep> {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Offset of the last step
    pub fn duration(&self) -> Duration {
        self.steps.last().map(ScenarioStep::offset).unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        for (index, pair) in self.steps.windows(2).enumerate() {
            if pair[1].at_ms < pair[0].at_ms {
                return Err(ScenarioError::OutOfOrder {
                    index: index + 1,
                    at_ms: pair[1].at_ms,
                });
            }
        }
        Ok(())
    }
}

/// Game handle for a session replayed by the host loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedGame {
    source: String,
}

impl ScriptedGame {
    /// No scenario attached, as for `test-sound` and `settings`
    pub const DETACHED: &'static str = "detached";

    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn detached() -> Self {
        Self::new(Self::DETACHED)
    }
}

impl GameData for ScriptedGame {
    fn source(&self) -> String {
        self.source.clone()
    }
}
