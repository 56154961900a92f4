use fov::{Fov, Vision};

use crate::prelude::*;

/// Line of sight over the station from one viewpoint.
struct Sight<'a> {
    grid: &'a TileGrid,
    closed_doors: HashSet<IVec2>,
    origin: IVec2,
    radius: i32,
    smoke_block: f32,
}

impl Vision for Sight<'_> {
    type Vector = IVec2;

    fn blocks_sight(&self, offset: [i32; 2]) -> bool {
        let p = self.origin + IVec2::from(offset);
        match self.grid.get(p) {
            Err(_) => true,
            Ok(tile) => {
                tile.kind().blocks_sight()
                    || tile.smoke() > self.smoke_block
                    || self.closed_doors.contains(&p)
            }
        }
    }

    fn in_range(&self, [x, y]: [i32; 2]) -> bool {
        x * x + y * y <= self.radius * self.radius + self.radius
    }

    fn max_depth(&self) -> i32 {
        self.radius
    }
}

/// Maintains the visible and explored flags of the grid.
pub struct VisibilityEngine<'a> {
    config: &'a Config,
}

impl<'a> VisibilityEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        VisibilityEngine { config }
    }

    /// Positions visible from `origin` in view order.
    pub fn field_of_view(
        &self,
        grid: &TileGrid,
        entities: &EntityRegistry,
        origin: IVec2,
        radius: i32,
    ) -> Vec<IVec2> {
        let sight = Sight {
            grid,
            closed_doors: entities
                .iter()
                .filter(|e| e.state.blocks_sight())
                .map(|e| e.pos)
                .collect(),
            origin,
            radius,
            smoke_block: self.config.smoke_sight_block,
        };
        Fov::new(&sight)
            .map(|v| origin + v)
            .filter(|&p| grid.contains(p))
            .collect()
    }

    /// Recompute visibility from the viewer's position.
    ///
    /// Tiles leaving view keep their explored flag and remember the hazard
    /// values they had when last seen. Returns the number of newly explored
    /// tiles.
    pub fn update(
        &self,
        grid: &mut TileGrid,
        entities: &EntityRegistry,
        origin: IVec2,
        radius: i32,
    ) -> Result<usize> {
        let seen = self.field_of_view(grid, entities, origin, radius);

        for tile in grid.tiles_mut() {
            tile.hide();
        }

        let mut discovered = 0;
        for p in seen {
            let tile = grid.get_mut(p)?;
            if !tile.is_explored() {
                discovered += 1;
            }
            tile.see();
        }
        Ok(discovered)
    }
}
