use serde::{Deserialize, Serialize};

use crate::{prelude::*, SensorType};

/// Player command for one turn.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    /// Step one tile in a cardinal direction.
    Move(IVec2),
    /// Use an adjacent entity, the first usable one if none is named.
    Interact(Option<EntityId>),
    Wait,
    /// Switch the active sensor on or off.
    ToggleSensor(SensorType),
    /// Clean the current tile, the whole neighborhood with a scrubber.
    Clean,
    Answer { deduction: String, answer: String },
    Choose(String),
}

impl Intent {
    /// Intents that need working actuators and fail while stunned.
    pub fn is_physical(&self) -> bool {
        matches!(self, Intent::Move(_) | Intent::Interact(_) | Intent::Clean)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Move(d) => write!(f, "move {} {}", d.x, d.y),
            Intent::Interact(None) => write!(f, "interact"),
            Intent::Interact(Some(id)) => write!(f, "interact {id}"),
            Intent::Wait => write!(f, "wait"),
            Intent::ToggleSensor(s) => write!(f, "sensor {s}"),
            Intent::Clean => write!(f, "clean"),
            Intent::Answer { deduction, answer } => {
                write!(f, "answer {deduction} {answer}")
            }
            Intent::Choose(id) => write!(f, "choose {id}"),
        }
    }
}
