//! Save files and replays.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{prelude::*, GameState, Intent, TurnScheduler, WorldSpec};

/// Save format version, bumped whenever saved data changes shape.
pub const SAVE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SaveFile<T> {
    version: u32,
    turn: u64,
    state: T,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

/// Write text, snappy compressed if the file name ends in `.sz`.
fn write(path: &Path, text: &str) -> Result<()> {
    if path.extension().is_some_and(|e| e == "sz") {
        let sz = snap::raw::Encoder::new()
            .compress_vec(text.as_bytes())
            .map_err(std::io::Error::from)?;
        fs::write(path, sz)?;
    } else {
        fs::write(path, text)?;
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let bytes = if path.extension().is_some_and(|e| e == "sz") {
        snap::raw::Decoder::new()
            .decompress_vec(&bytes)
            .map_err(std::io::Error::from)?
    } else {
        bytes
    };
    String::from_utf8(bytes).map_err(|e| {
        Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Serialize a game state into save file text.
pub fn state_to_string(state: &GameState) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SaveFile {
        version: SAVE_VERSION,
        turn: state.turn,
        state,
    })?)
}

/// Parse save file text, refusing states that break invariants.
pub fn state_from_str(text: &str) -> Result<GameState> {
    let Header { version } = serde_json::from_str(text)?;
    if version != SAVE_VERSION {
        return Err(Error::VersionMismatch {
            expected: SAVE_VERSION,
            found: version,
        });
    }
    let save: SaveFile<GameState> = serde_json::from_str(text)?;
    if save.turn != save.state.turn {
        return broken(format!(
            "save header turn {} does not match state turn {}",
            save.turn, save.state.turn
        ));
    }
    save.state.check()?;
    Ok(save.state)
}

pub fn save(state: &GameState, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write(path, &state_to_string(state)?)?;
    log::info!("saved turn {} to {}", state.turn, path.display());
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<GameState> {
    let path = path.as_ref();
    let state = state_from_str(&read(path)?)?;
    log::info!("loaded turn {} from {}", state.turn, path.display());
    Ok(state)
}

/// Intents played on a generated station.
///
/// Running a replay rebuilds the exact same game, since generation and
/// turn resolution are both deterministic.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Replay {
    pub spec: WorldSpec,
    pub config: Config,
    pub intents: Vec<Intent>,
}

impl Replay {
    pub fn new(spec: WorldSpec, config: Config) -> Self {
        Replay {
            spec,
            config,
            intents: Vec::new(),
        }
    }

    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Replay every intent on a freshly generated station.
    ///
    /// Rejected intents are skipped the same way they were during play.
    pub fn run(&self) -> Result<GameState> {
        Ok(self.scheduler()?.state().as_ref().clone())
    }

    /// Replay into a scheduler that can keep playing from the end.
    pub fn scheduler(&self) -> Result<TurnScheduler> {
        let mut scheduler = TurnScheduler::generate(&self.spec, self.config)?;
        for intent in &self.intents {
            match scheduler.advance_turn(intent.clone()) {
                Ok(_) => {}
                Err(Error::GameOver) => break,
                Err(e) if e.is_rejection() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(scheduler)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write(path.as_ref(), &serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Replay> {
        Ok(serde_json::from_str(&read(path.as_ref())?)?)
    }
}
