use glam::IVec2;

use crate::EntityId;

/// Failures of engine operations.
///
/// `OutOfBounds`, `IllegalIntent` and `AlreadyAnswered` are ordinary
/// outcomes of player input. The turn is not consumed and the state is left
/// as it was apart from a log entry. `InvariantViolation` means the state
/// itself is broken.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("position {pos} is outside the station")]
    OutOfBounds { pos: IVec2 },

    #[error("{0}")]
    IllegalIntent(String),

    #[error("deduction {id} has already been answered")]
    AlreadyAnswered { id: String, correct: bool },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("no entity {0}")]
    UnknownEntity(EntityId),

    #[error("no deduction named {0}")]
    UnknownDeduction(String),

    #[error("the game is over")]
    GameOver,

    #[error("bad configuration: {0}")]
    Config(String),

    #[error("save file version {found} is not supported, expected {expected}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is a rejected player intent rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::OutOfBounds { .. }
                | Error::IllegalIntent(_)
                | Error::AlreadyAnswered { .. }
                | Error::UnknownEntity(_)
                | Error::UnknownDeduction(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject a player intent with a message shown to the player.
pub fn illegal<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::IllegalIntent(msg.into()))
}

pub fn broken<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::InvariantViolation(msg.into()))
}
