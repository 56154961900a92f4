use serde::{Deserialize, Serialize};
use util::{AsciiMap, Rect};

use crate::prelude::*;

/// Rectangular grid of station tiles.
///
/// Every lookup is bounds checked. Serializes as a list of rows.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Tile>>", into = "Vec<Vec<Tile>>")]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Create a grid of solid walls.
    pub fn new(width: i32, height: i32) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        TileGrid {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
        }
    }

    /// Build terrain from a character map.
    ///
    /// Characters that aren't terrain glyphs become floor, so fixture maps
    /// can mark entity positions in place.
    pub fn from_ascii(map: &AsciiMap) -> Self {
        let mut ret = TileGrid::new(map.width(), map.height());
        for (p, c) in map.iter() {
            let kind = match c {
                ' ' => TileType::Wall,
                c => TileType::try_from(c).unwrap_or(TileType::Floor),
            };
            let i = ret.idx(p);
            ret.tiles[i] = Tile::new(kind);
        }
        ret
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized([self.width, self.height])
    }

    pub fn contains(&self, p: IVec2) -> bool {
        self.bounds().contains(p)
    }

    fn idx(&self, p: IVec2) -> usize {
        (p.x + p.y * self.width) as usize
    }

    fn index(&self, p: IVec2) -> Result<usize> {
        if self.contains(p) {
            Ok(self.idx(p))
        } else {
            Err(Error::OutOfBounds { pos: p })
        }
    }

    pub fn get(&self, p: IVec2) -> Result<&Tile> {
        let i = self.index(p)?;
        Ok(&self.tiles[i])
    }

    pub(crate) fn get_mut(&mut self, p: IVec2) -> Result<&mut Tile> {
        let i = self.index(p)?;
        Ok(&mut self.tiles[i])
    }

    /// Walkability lookup that treats out of bounds as solid.
    pub fn is_walkable(&self, p: IVec2) -> bool {
        self.get(p).is_ok_and(Tile::is_walkable)
    }

    pub(crate) fn set_kind(&mut self, p: IVec2, kind: TileType) -> Result<()> {
        self.get_mut(p)?.set_kind(kind);
        Ok(())
    }

    /// Simulation value of a hazard field, regardless of what the player
    /// has seen. Use [`Tile::reading`] for the player's view.
    pub fn hazard(&self, p: IVec2, field: HazardField) -> Result<f32> {
        Ok(self.get(p)?.hazards().get(field))
    }

    /// Write a hazard value, clamping it to the top of the field's range.
    ///
    /// Returns the value actually stored. Negative and NaN values are
    /// refused, since they can only come from a broken computation.
    pub fn set_hazard(
        &mut self,
        p: IVec2,
        field: HazardField,
        value: f32,
    ) -> Result<f32> {
        if value.is_nan() || value < 0.0 {
            return Err(Error::InvariantViolation(format!(
                "{field} value {value} at {p}"
            )));
        }
        let value = value.min(field.max());
        *self.get_mut(p)?.hazards_mut().get_mut(field) = value;
        Ok(value)
    }

    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        self.bounds().iter()
    }

    /// Iterate tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Tile)> + '_ {
        self.positions().zip(self.tiles.iter())
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    /// Walkable cardinal neighbors of a position in a fixed order.
    pub fn walkable_neighbors(
        &self,
        p: IVec2,
    ) -> impl Iterator<Item = IVec2> + '_ {
        DIR_4
            .iter()
            .map(move |&d| p + d)
            .filter(|&q| self.is_walkable(q))
    }

    pub fn explored_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_explored()).count()
    }

    /// Check the structural invariants of the grid.
    pub fn check(&self) -> Result<()> {
        if self.tiles.len() != (self.width * self.height) as usize {
            return broken("grid size does not match its dimensions");
        }
        for (p, tile) in self.iter() {
            if tile.is_walkable() != tile.kind().is_walkable() {
                return broken(format!("walkability out of sync at {p}"));
            }
            if tile.is_visible() && !tile.is_explored() {
                return broken(format!("visible but unexplored tile at {p}"));
            }
            for field in HazardField::iter() {
                let v = tile.hazards().get(field);
                if !(0.0..=field.max()).contains(&v) {
                    return broken(format!("{field} {v} out of range at {p}"));
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<Tile>>> for TileGrid {
    type Error = String;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, Vec::len) as i32;
        if rows.iter().any(|r| r.len() as i32 != width) {
            return Err("tile rows have different lengths".into());
        }
        Ok(TileGrid {
            width,
            height,
            tiles: rows.into_iter().flatten().collect(),
        })
    }
}

impl From<TileGrid> for Vec<Vec<Tile>> {
    fn from(grid: TileGrid) -> Self {
        if grid.width == 0 {
            return Vec::new();
        }
        grid.tiles
            .chunks(grid.width as usize)
            .map(<[Tile]>::to_vec)
            .collect()
    }
}
