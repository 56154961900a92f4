//! Station entities as a closed set of kinds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display, EnumIter, EnumString};

use crate::{prelude::*, Attachment, Clue, SensorType, Vitals};

/// Stable entity identifier, never reused within a game.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EntityId(s.strip_prefix('#').unwrap_or(s).parse()?))
    }
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum EntityKind {
    Relay,
    SensorPickup,
    DataCore,
    ServiceBot,
    LogTerminal,
    CrewItem,
    Drone,
    MedKit,
    RepairBot,
    Breach,
    ClosedDoor,
    SecurityTerminal,
    PatrolDrone,
    PressureValve,
    FuseBox,
    PowerCell,
    EscapePod,
    CrewNpc,
    Airlock,
    ToolPickup,
    UtilityPickup,
    Console,
    RepairCradle,
    EvidenceTrace,
}

impl EntityKind {
    /// Name for messages.
    pub fn noun(self) -> &'static str {
        use EntityKind::*;
        match self {
            Relay => "power relay",
            SensorPickup => "sensor module",
            DataCore => "data core",
            ServiceBot => "service bot",
            LogTerminal => "log terminal",
            CrewItem => "personal item",
            Drone => "scout drone",
            MedKit => "repair kit",
            RepairBot => "repair bot",
            Breach => "hull breach",
            ClosedDoor => "door",
            SecurityTerminal => "security terminal",
            PatrolDrone => "patrol drone",
            PressureValve => "pressure valve",
            FuseBox => "fuse box",
            PowerCell => "power cell",
            EscapePod => "escape pod",
            CrewNpc => "crew member",
            Airlock => "airlock",
            ToolPickup => "tool attachment",
            UtilityPickup => "utility attachment",
            Console => "console",
            RepairCradle => "repair cradle",
            EvidenceTrace => "trace",
        }
    }

    /// Map glyph.
    pub fn glyph(self) -> char {
        use EntityKind::*;
        match self {
            Relay => 'R',
            SensorPickup => 's',
            DataCore => 'D',
            ServiceBot => 'b',
            LogTerminal => 'T',
            CrewItem => 'i',
            Drone => 'd',
            MedKit => 'm',
            RepairBot => 'r',
            Breach => 'B',
            ClosedDoor => '|',
            SecurityTerminal => 'S',
            PatrolDrone => 'X',
            PressureValve => 'V',
            FuseBox => 'F',
            PowerCell => 'c',
            EscapePod => 'P',
            CrewNpc => 'C',
            Airlock => 'A',
            ToolPickup => 't',
            UtilityPickup => 'u',
            Console => 'K',
            RepairCradle => 'H',
            EvidenceTrace => 'e',
        }
    }
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Relay {
    pub activated: bool,
    pub locked: bool,
    /// An overloaded relay pumps heat and smoke into its tile.
    pub overloaded: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct SensorPickup {
    pub sensor: SensorType,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DataCore {
    pub transmitted: bool,
    pub clue: Option<Clue>,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceBot {
    pub activated: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LogTerminal {
    pub title: String,
    pub read: bool,
    pub clue: Option<Clue>,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewItem {
    pub name: String,
    pub examined: bool,
    pub clue: Option<Clue>,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Drone {
    pub activated: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct MedKit {
    pub heal: i32,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairBot {
    pub activated: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Breach {
    pub sealed: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosedDoor {
    pub open: bool,
    pub locked: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityTerminal {
    pub activated: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolDrone {
    pub disabled: bool,
    /// Current patrol step, reversed when the way ahead is blocked.
    pub heading: IVec2,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureValve {
    pub opened: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FuseBox {
    pub powered: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct PowerCell {}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapePod {
    pub capacity: usize,
    pub boarded: Vec<EntityId>,
    pub launched: bool,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewNpc {
    pub name: String,
    pub found: bool,
    pub following: bool,
    pub evacuated: bool,
    pub dead: bool,
    pub vitals: Vitals,
}

impl CrewNpc {
    /// Crew that is neither dead nor evacuated.
    pub fn is_aboard(&self) -> bool {
        !self.dead && !self.evacuated
    }
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Airlock {
    pub cycled: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ToolPickup {
    pub attachment: Attachment,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct UtilityPickup {
    pub attachment: Attachment,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Console {
    pub accessed: bool,
    pub clue: Option<Clue>,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairCradle {
    pub charges: u32,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct EvidenceTrace {
    /// Sensor that picks up the trace.
    pub sensor: SensorType,
    #[serde(default)]
    pub examined: bool,
    #[serde(default)]
    pub clue: Option<Clue>,
}

/// Kind-specific state of an entity.
///
/// Matches over this enum are exhaustive, so adding a kind makes the
/// compiler point out every rule that needs to handle it.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EntityState {
    Relay(Relay),
    SensorPickup(SensorPickup),
    DataCore(DataCore),
    ServiceBot(ServiceBot),
    LogTerminal(LogTerminal),
    CrewItem(CrewItem),
    Drone(Drone),
    MedKit(MedKit),
    RepairBot(RepairBot),
    Breach(Breach),
    ClosedDoor(ClosedDoor),
    SecurityTerminal(SecurityTerminal),
    PatrolDrone(PatrolDrone),
    PressureValve(PressureValve),
    FuseBox(FuseBox),
    PowerCell(PowerCell),
    EscapePod(EscapePod),
    CrewNpc(CrewNpc),
    Airlock(Airlock),
    ToolPickup(ToolPickup),
    UtilityPickup(UtilityPickup),
    Console(Console),
    RepairCradle(RepairCradle),
    EvidenceTrace(EvidenceTrace),
}

impl EntityState {
    pub fn kind(&self) -> EntityKind {
        use EntityState::*;
        match self {
            Relay(_) => EntityKind::Relay,
            SensorPickup(_) => EntityKind::SensorPickup,
            DataCore(_) => EntityKind::DataCore,
            ServiceBot(_) => EntityKind::ServiceBot,
            LogTerminal(_) => EntityKind::LogTerminal,
            CrewItem(_) => EntityKind::CrewItem,
            Drone(_) => EntityKind::Drone,
            MedKit(_) => EntityKind::MedKit,
            RepairBot(_) => EntityKind::RepairBot,
            Breach(_) => EntityKind::Breach,
            ClosedDoor(_) => EntityKind::ClosedDoor,
            SecurityTerminal(_) => EntityKind::SecurityTerminal,
            PatrolDrone(_) => EntityKind::PatrolDrone,
            PressureValve(_) => EntityKind::PressureValve,
            FuseBox(_) => EntityKind::FuseBox,
            PowerCell(_) => EntityKind::PowerCell,
            EscapePod(_) => EntityKind::EscapePod,
            CrewNpc(_) => EntityKind::CrewNpc,
            Airlock(_) => EntityKind::Airlock,
            ToolPickup(_) => EntityKind::ToolPickup,
            UtilityPickup(_) => EntityKind::UtilityPickup,
            Console(_) => EntityKind::Console,
            RepairCradle(_) => EntityKind::RepairCradle,
            EvidenceTrace(_) => EntityKind::EvidenceTrace,
        }
    }

    /// Whether interacting with the entity can no longer do anything.
    ///
    /// Exhausted entities stay in the registry and show up dimmed.
    pub fn is_exhausted(&self) -> bool {
        use EntityState::*;
        match self {
            Relay(a) => a.activated,
            DataCore(a) => a.transmitted,
            ServiceBot(a) => a.activated,
            LogTerminal(a) => a.read,
            CrewItem(a) => a.examined,
            Drone(a) => a.activated,
            RepairBot(a) => a.activated,
            Breach(a) => a.sealed,
            ClosedDoor(a) => a.open,
            SecurityTerminal(a) => a.activated,
            PatrolDrone(a) => a.disabled,
            PressureValve(a) => a.opened,
            FuseBox(a) => a.powered,
            EscapePod(a) => a.launched,
            CrewNpc(a) => a.following || !a.is_aboard(),
            Airlock(a) => a.cycled,
            Console(a) => a.accessed,
            RepairCradle(a) => a.charges == 0,
            EvidenceTrace(a) => a.examined,
            // Pickups leave the registry when taken.
            SensorPickup(_) | MedKit(_) | PowerCell(_) | ToolPickup(_)
            | UtilityPickup(_) => false,
        }
    }

    /// Whether the entity occupies its tile so nothing else can enter.
    pub fn blocks_movement(&self) -> bool {
        use EntityState::*;
        match self {
            ClosedDoor(a) => !a.open,
            CrewNpc(a) => a.is_aboard(),
            Relay(_) | DataCore(_) | ServiceBot(_) | LogTerminal(_)
            | Drone(_) | RepairBot(_) | SecurityTerminal(_)
            | PatrolDrone(_) | PressureValve(_) | FuseBox(_)
            | EscapePod(_) | Airlock(_) | Console(_) | RepairCradle(_) => true,
            SensorPickup(_) | CrewItem(_) | MedKit(_) | Breach(_)
            | PowerCell(_) | ToolPickup(_) | UtilityPickup(_)
            | EvidenceTrace(_) => false,
        }
    }

    pub fn blocks_sight(&self) -> bool {
        matches!(self, EntityState::ClosedDoor(a) if !a.open)
    }

    /// Picked up by walking over.
    pub fn is_pickup(&self) -> bool {
        use EntityState::*;
        matches!(
            self,
            SensorPickup(_)
                | MedKit(_)
                | PowerCell(_)
                | ToolPickup(_)
                | UtilityPickup(_)
        )
    }

    /// Only perceived once revealed by a sensor or a drone.
    pub fn is_hidden_by_default(&self) -> bool {
        matches!(self, EntityState::EvidenceTrace(_))
    }

    /// Mobile entities that tag along after the player.
    pub fn is_following(&self) -> bool {
        use EntityState::*;
        match self {
            CrewNpc(a) => a.following && a.is_aboard(),
            RepairBot(a) => a.activated,
            _ => false,
        }
    }

    pub fn clue(&self) -> Option<&Clue> {
        use EntityState::*;
        match self {
            DataCore(a) => a.clue.as_ref(),
            LogTerminal(a) => a.clue.as_ref(),
            CrewItem(a) => a.clue.as_ref(),
            Console(a) => a.clue.as_ref(),
            EvidenceTrace(a) => a.clue.as_ref(),
            _ => None,
        }
    }
}

/// Common accessors of things with an identity and a position.
pub trait EntityLike {
    fn id(&self) -> EntityId;
    fn pos(&self) -> IVec2;
    fn kind(&self) -> EntityKind;
}

/// Entity record in the registry.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: IVec2,
    /// Perceivable regardless of line of sight and smoke.
    #[serde(default)]
    pub revealed: bool,
    #[serde(flatten)]
    pub state: EntityState,
}

impl EntityLike for Entity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> IVec2 {
        self.pos
    }

    fn kind(&self) -> EntityKind {
        self.state.kind()
    }
}

impl Entity {
    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }

    /// Display name, crew members go by their own name.
    pub fn name(&self) -> String {
        match &self.state {
            EntityState::CrewNpc(c) if !c.name.is_empty() => c.name.clone(),
            EntityState::LogTerminal(t) if !t.title.is_empty() => {
                format!("terminal \"{}\"", t.title)
            }
            EntityState::CrewItem(i) if !i.name.is_empty() => i.name.clone(),
            s => s.kind().noun().to_owned(),
        }
    }
}
