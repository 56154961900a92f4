use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Terrain type of a station tile.
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
pub enum TileType {
    #[default]
    Wall,
    Floor,
    Corridor,
    Door,
    LockedDoor,
}

impl TileType {
    pub fn is_walkable(self) -> bool {
        matches!(self, TileType::Floor | TileType::Corridor | TileType::Door)
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, TileType::Wall | TileType::LockedDoor)
    }
}

impl TryFrom<char> for TileType {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        use TileType::*;
        match c {
            '#' => Ok(Wall),
            '.' => Ok(Floor),
            ',' => Ok(Corridor),
            '+' => Ok(Door),
            '=' => Ok(LockedDoor),
            c => Err(c),
        }
    }
}

impl From<TileType> for char {
    fn from(t: TileType) -> Self {
        use TileType::*;
        match t {
            Wall => '#',
            Floor => '.',
            Corridor => ',',
            Door => '+',
            LockedDoor => '=',
        }
    }
}

/// The four scalar hazard fields simulated on every tile.
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
)]
#[serde(rename_all = "kebab-case")]
pub enum HazardField {
    Heat,
    Smoke,
    Pressure,
    Dirt,
}

impl HazardField {
    /// Upper bound of the field's legal range. The lower bound is zero.
    pub fn max(self) -> f32 {
        match self {
            HazardField::Heat => crate::HEAT_MAX,
            HazardField::Smoke | HazardField::Pressure | HazardField::Dirt => {
                crate::FIELD_MAX
            }
        }
    }
}

/// Hazard values of one tile.
#[derive(Copy, Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct HazardReading {
    pub heat: f32,
    pub smoke: f32,
    pub pressure: f32,
    pub dirt: f32,
}

impl HazardReading {
    pub fn get(&self, field: HazardField) -> f32 {
        match field {
            HazardField::Heat => self.heat,
            HazardField::Smoke => self.smoke,
            HazardField::Pressure => self.pressure,
            HazardField::Dirt => self.dirt,
        }
    }

    pub(crate) fn get_mut(&mut self, field: HazardField) -> &mut f32 {
        match field {
            HazardField::Heat => &mut self.heat,
            HazardField::Smoke => &mut self.smoke,
            HazardField::Pressure => &mut self.pressure,
            HazardField::Dirt => &mut self.dirt,
        }
    }
}

/// One cell of the station grid.
///
/// Fields are read-only outside the engine. Terrain changes go through
/// [`TileGrid`](crate::TileGrid) so that `walkable` stays in sync with the
/// terrain type, and hazard values are only written by the hazard
/// simulation.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Tile {
    #[serde(rename = "type")]
    kind: TileType,
    walkable: bool,
    explored: bool,
    visible: bool,
    hazards: HazardReading,
    /// Hazard values as they were when the tile was last in view.
    memory: HazardReading,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::new(TileType::Wall)
    }
}

impl From<TileType> for Tile {
    fn from(kind: TileType) -> Self {
        Tile::new(kind)
    }
}

impl Tile {
    pub fn new(kind: TileType) -> Self {
        let mut hazards = HazardReading::default();
        if kind.is_walkable() {
            hazards.pressure = crate::FIELD_MAX;
        }
        Tile {
            kind,
            walkable: kind.is_walkable(),
            explored: false,
            visible: false,
            hazards,
            memory: Default::default(),
        }
    }

    pub fn kind(&self) -> TileType {
        self.kind
    }

    pub fn is_walkable(&self) -> bool {
        self.walkable
    }

    pub fn is_explored(&self) -> bool {
        self.explored
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current hazard values regardless of what the player knows.
    pub(crate) fn hazards(&self) -> &HazardReading {
        &self.hazards
    }

    pub(crate) fn heat(&self) -> f32 {
        self.hazards.heat
    }

    pub(crate) fn smoke(&self) -> f32 {
        self.hazards.smoke
    }

    pub(crate) fn pressure(&self) -> f32 {
        self.hazards.pressure
    }

    pub(crate) fn dirt(&self) -> f32 {
        self.hazards.dirt
    }

    /// Hazard values as far as the player knows them.
    ///
    /// Live values for visible tiles, remembered values for explored tiles
    /// out of view, and zeros for tiles never seen.
    pub fn reading(&self) -> HazardReading {
        if self.visible {
            self.hazards
        } else if self.explored {
            self.memory
        } else {
            Default::default()
        }
    }

    pub(crate) fn set_kind(&mut self, kind: TileType) {
        self.kind = kind;
        self.walkable = kind.is_walkable();
    }

    pub(crate) fn hazards_mut(&mut self) -> &mut HazardReading {
        &mut self.hazards
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }

    /// Mark the tile as currently seen.
    pub(crate) fn see(&mut self) {
        self.visible = true;
        self.explored = true;
        self.memory = self.hazards;
    }
}
