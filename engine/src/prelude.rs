pub use crate::{
    broken, illegal, Config, EntityId, EntityKind, EntityLike, EntityRegistry,
    Error, HazardField, Result, Tile, TileGrid, TileType, Zone,
};
pub use glam::{ivec2, IVec2};
pub use strum::IntoEnumIterator;
pub use util::{HashMap, HashSet, Rect, VecExt, DIR_4, DIR_8};
