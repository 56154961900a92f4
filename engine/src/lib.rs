//! Simulation core of a derelict station salvage game.
//!
//! The state of a game is a plain [`GameState`] value. A [`TurnScheduler`]
//! owns the authoritative copy and advances it one player [`Intent`] at a
//! time, everything else only reads snapshots.

use static_assertions::const_assert;

/// Ceiling for tile heat values.
pub const HEAT_MAX: f32 = 150.0;

/// Ceiling for smoke, pressure and dirt values.
pub const FIELD_MAX: f32 = 100.0;

const_assert!(HEAT_MAX >= FIELD_MAX);
const_assert!(FIELD_MAX > 0.0);

mod action;

mod ai;

mod config;
pub use config::*;

mod display;
pub use display::{map_glyph, overlay_digit, present, Display, UiContext};

pub mod entity;
pub use entity::{Entity, EntityId, EntityKind, EntityLike, EntityState};

mod error;
pub use error::{broken, illegal, Error, Result};

mod grid;
pub use grid::TileGrid;

mod hazard;
pub use hazard::HazardPropagator;

mod intent;
pub use intent::Intent;

mod interact;

mod mapgen;
pub use mapgen::{generate, StationPlan};

mod msg;
pub use msg::{LogEntry, LogKind, Logs};

mod mystery;
pub use mystery::{
    Choice, Clue, Deduction, DeductionEngine, Evacuation, Evidence, EvidenceId,
    Journal, Mystery,
};

mod phase;
pub use phase::{Milestones, ObjectivePhase, ObjectivePhaseController, Outcome};

mod player;
pub use player::{
    Attachment, AttachmentSlot, Player, SensorType, Sensors, Vitals,
};

pub mod prelude;

mod registry;
pub use registry::{EntityRegistry, Query};

pub mod save;
pub use save::Replay;

pub mod scenario;

mod scheduler;
pub use scheduler::{resolve, SchedulerState, TurnScheduler};

mod state;
pub use state::{GameState, Room, Stats, Zone};

mod tile;
pub use tile::{HazardField, HazardReading, Tile, TileType};

mod visibility;
pub use visibility::VisibilityEngine;
