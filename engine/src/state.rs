use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use util::{AsciiMap, Rect};

use crate::{
    entity::*, prelude::*, Archetype, Attachment, DeductionEngine, Entity,
    EntityState, Logs, Mystery, Player, Query, SensorType, Vitals,
};

#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    Command,
    #[default]
    Engineering,
    Habitat,
    Science,
    Cargo,
}

/// Named rectangular room. The bounds cover the floor, not the walls.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub name: String,
    pub zone: Zone,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn new(id: u32, name: &str, zone: Zone, bounds: Rect) -> Self {
        Room {
            id,
            name: name.into(),
            zone,
            x: bounds.min.x,
            y: bounds.min.y,
            width: bounds.width(),
            height: bounds.height(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new([self.x, self.y], [self.width, self.height])
    }

    pub fn contains(&self, p: IVec2) -> bool {
        self.bounds().contains(p)
    }
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Stats {
    pub tiles_cleaned: u32,
    pub damage_taken: i32,
    pub crew_found: u32,
}

/// Complete state of a game.
///
/// Snapshots handed out by the turn scheduler are immutable values of this
/// type, and a serialized state is a complete save game.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GameState {
    pub config: Config,
    pub turn: u64,
    pub tiles: TileGrid,
    pub rooms: Vec<Room>,
    pub entities: EntityRegistry,
    pub player: Player,
    pub logs: Logs,
    pub mystery: Mystery,
    #[serde(default)]
    pub stats: Stats,
    pub game_over: bool,
    pub victory: bool,
}

impl GameState {
    /// Empty station with the player at the given position.
    pub fn new(config: Config, tiles: TileGrid, player: Player) -> Self {
        GameState {
            config,
            turn: 0,
            tiles,
            rooms: Vec::new(),
            entities: Default::default(),
            player,
            logs: Default::default(),
            mystery: Default::default(),
            stats: Default::default(),
            game_over: false,
            victory: false,
        }
    }

    /// Build a small station from a character map.
    ///
    /// Terrain uses the tile glyphs, `@` places the player, and entity
    /// glyphs spawn an entity of that kind in its starting state. The whole
    /// map is a single room.
    pub fn from_ascii(text: &str) -> Result<Self> {
        Self::from_ascii_with(Config::default(), Archetype::default(), text)
    }

    pub fn from_ascii_with(
        config: Config,
        archetype: Archetype,
        text: &str,
    ) -> Result<Self> {
        let map = AsciiMap::new(text);
        let mut players = map.find('@');
        let (Some(start), None) = (players.next(), players.next()) else {
            return Err(Error::Config("map needs exactly one @".into()));
        };

        let tiles = TileGrid::from_ascii(&map);
        let mut state = GameState::new(config, tiles, archetype.player(start));
        state.rooms.push(Room::new(
            0,
            "Compartment",
            Zone::Engineering,
            state.tiles.bounds(),
        ));

        for (p, c) in map.iter() {
            if let Some(kind) = EntityKind::iter().find(|k| k.glyph() == c) {
                state.entities.spawn(p, EntityState::initial(kind, &config));
            }
        }
        Ok(state)
    }

    pub fn width(&self) -> i32 {
        self.tiles.width()
    }

    pub fn height(&self) -> i32 {
        self.tiles.height()
    }

    pub fn room_at(&self, p: IVec2) -> Option<&Room> {
        self.rooms.iter().find(|r| r.contains(p))
    }

    pub fn sight_radius(&self) -> i32 {
        self.player.sight_radius(&self.config)
    }

    /// Entities the player can currently perceive.
    pub fn perceived<'a>(
        &'a self,
        filter: &'a Query,
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .query(&self.tiles, &self.config, self.player.pos, filter)
    }

    pub fn is_perceived(&self, e: &Entity) -> bool {
        self.entities
            .is_perceived(&self.tiles, &self.config, self.player.pos, e)
    }

    /// Ids of deductions the player can answer now.
    pub fn open_deductions(&self) -> Vec<String> {
        DeductionEngine::unlocked(&self.mystery)
            .map(|d| d.id.clone())
            .collect()
    }

    /// Check every structural invariant of the state.
    pub fn check(&self) -> Result<()> {
        self.tiles.check()?;
        self.entities.check(&self.tiles)?;

        if !self.tiles.contains(self.player.pos) {
            return broken("player is off the grid");
        }
        if self.player.hp() > self.player.max_hp() {
            return broken("player hp exceeds maximum");
        }

        let ids = self.mystery.journal.ids();
        if ids.len() != self.mystery.journal.len() {
            return broken("journal has duplicate evidence");
        }
        let evac = &self.mystery.evacuation;
        if evac.crew_evacuated.iter().any(|id| evac.crew_dead.contains(id)) {
            return broken("crew member both evacuated and dead");
        }
        Ok(())
    }
}

impl EntityState {
    /// Fresh entity of a kind with stock properties.
    pub fn initial(kind: EntityKind, config: &Config) -> Self {
        use EntityKind as K;
        match kind {
            K::Relay => EntityState::Relay(Default::default()),
            K::SensorPickup => EntityState::SensorPickup(SensorPickup {
                sensor: SensorType::Trace,
            }),
            K::DataCore => EntityState::DataCore(Default::default()),
            K::ServiceBot => EntityState::ServiceBot(Default::default()),
            K::LogTerminal => EntityState::LogTerminal(Default::default()),
            K::CrewItem => EntityState::CrewItem(Default::default()),
            K::Drone => EntityState::Drone(Default::default()),
            K::MedKit => EntityState::MedKit(MedKit {
                heal: config.medkit_heal,
            }),
            K::RepairBot => EntityState::RepairBot(Default::default()),
            K::Breach => EntityState::Breach(Default::default()),
            K::ClosedDoor => EntityState::ClosedDoor(Default::default()),
            K::SecurityTerminal => {
                EntityState::SecurityTerminal(Default::default())
            }
            K::PatrolDrone => EntityState::PatrolDrone(PatrolDrone {
                disabled: false,
                heading: ivec2(1, 0),
            }),
            K::PressureValve => EntityState::PressureValve(Default::default()),
            K::FuseBox => EntityState::FuseBox(Default::default()),
            K::PowerCell => EntityState::PowerCell(Default::default()),
            K::EscapePod => EntityState::EscapePod(EscapePod {
                capacity: 2,
                ..Default::default()
            }),
            K::CrewNpc => EntityState::CrewNpc(CrewNpc {
                name: "Crew member".into(),
                vitals: Vitals::new(6),
                ..Default::default()
            }),
            K::Airlock => EntityState::Airlock(Default::default()),
            K::ToolPickup => EntityState::ToolPickup(ToolPickup {
                attachment: Attachment::Extinguisher,
            }),
            K::UtilityPickup => EntityState::UtilityPickup(UtilityPickup {
                attachment: Attachment::HeatShield,
            }),
            K::Console => EntityState::Console(Default::default()),
            K::RepairCradle => {
                EntityState::RepairCradle(RepairCradle { charges: 1 })
            }
            K::EvidenceTrace => EntityState::EvidenceTrace(EvidenceTrace {
                sensor: SensorType::Trace,
                examined: false,
                clue: None,
            }),
        }
    }
}
