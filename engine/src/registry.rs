use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{prelude::*, Entity, EntityState};

/// Filter for perception-gated entity queries.
#[derive(Clone, Default, Debug)]
pub struct Query {
    kind: Option<EntityKind>,
    within: Option<(IVec2, i32)>,
    active_only: bool,
}

impl Query {
    pub fn all() -> Self {
        Default::default()
    }

    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Only entities within king's move distance of a point.
    pub fn within(mut self, center: IVec2, radius: i32) -> Self {
        self.within = Some((center, radius));
        self
    }

    /// Leave out exhausted entities.
    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    fn accepts(&self, e: &Entity) -> bool {
        if self.kind.is_some_and(|k| k != e.kind()) {
            return false;
        }
        if let Some((center, r)) = self.within {
            if (e.pos - center).king_len() > r {
                return false;
            }
        }
        !(self.active_only && e.is_exhausted())
    }
}

/// Every entity of the station keyed by id.
///
/// Ids are handed out in increasing order and iteration follows id order,
/// which keeps every pass over the entities deterministic.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EntityRegistry {
    next_id: u32,
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn spawn(&mut self, pos: IVec2, state: EntityState) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(
            id,
            Entity {
                id,
                pos,
                revealed: false,
                state,
            },
        );
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(&id).ok_or(Error::UnknownEntity(id))
    }

    /// Every entity regardless of what the player can perceive.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn at(&self, pos: IVec2) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.pos == pos)
    }

    /// Entity blocking movement into a tile, if any.
    pub fn blocker_at(&self, pos: IVec2) -> Option<&Entity> {
        self.at(pos).find(|e| e.state.blocks_movement())
    }

    /// Whether the player can currently perceive the entity.
    pub fn is_perceived(
        &self,
        grid: &TileGrid,
        config: &Config,
        viewer: IVec2,
        e: &Entity,
    ) -> bool {
        if e.revealed {
            return true;
        }
        if e.state.is_hidden_by_default() {
            return false;
        }
        let Ok(tile) = grid.get(e.pos) else {
            return false;
        };
        if !tile.is_visible() {
            return false;
        }
        // Thick smoke hides whatever isn't right next to the viewer.
        tile.smoke() <= config.smoke_sight_block
            || (e.pos - viewer).king_len() <= 1
    }

    /// Entities the player can perceive that match the filter.
    pub fn query<'a>(
        &'a self,
        grid: &'a TileGrid,
        config: &'a Config,
        viewer: IVec2,
        filter: &'a Query,
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        self.iter().filter(move |e| {
            filter.accepts(e) && self.is_perceived(grid, config, viewer, e)
        })
    }

    /// Change the state of an entity.
    pub(crate) fn mutate<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut EntityState) -> R,
    ) -> Result<R> {
        let e = self.entities.get_mut(&id).ok_or(Error::UnknownEntity(id))?;
        Ok(f(&mut e.state))
    }

    pub(crate) fn relocate(&mut self, id: EntityId, pos: IVec2) -> Result<()> {
        let e = self.entities.get_mut(&id).ok_or(Error::UnknownEntity(id))?;
        e.pos = pos;
        Ok(())
    }

    pub(crate) fn reveal(&mut self, id: EntityId) -> Result<bool> {
        let e = self.entities.get_mut(&id).ok_or(Error::UnknownEntity(id))?;
        let was = e.revealed;
        e.revealed = true;
        Ok(!was)
    }

    /// Take an entity out of the world, used for consumed pickups.
    pub(crate) fn remove(&mut self, id: EntityId) -> Result<Entity> {
        self.entities.remove(&id).ok_or(Error::UnknownEntity(id))
    }

    pub fn check(&self, grid: &TileGrid) -> Result<()> {
        for (id, e) in &self.entities {
            if *id != e.id {
                return broken(format!("entity {} filed under {id}", e.id));
            }
            if id.0 > self.next_id {
                return broken(format!("entity {id} is past the id counter"));
            }
            if !grid.contains(e.pos) {
                return broken(format!("entity {id} is off the grid"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use util::AsciiMap;

    use super::*;
    use crate::entity::{EvidenceTrace, Relay};
    use crate::SensorType;

    fn setup() -> (TileGrid, EntityRegistry) {
        let mut grid = TileGrid::from_ascii(&AsciiMap::new(
            "
            #######
            #.....#
            #.....#
            #######",
        ));
        for p in grid.positions().collect::<Vec<_>>() {
            if grid.is_walkable(p) {
                grid.get_mut(p).unwrap().see();
            }
        }
        (grid, EntityRegistry::default())
    }

    #[test]
    fn ids_are_never_reused() {
        let (_, mut r) = setup();
        let a = r.spawn(ivec2(1, 1), EntityState::PowerCell(Default::default()));
        r.remove(a).unwrap();
        let b = r.spawn(ivec2(1, 1), EntityState::PowerCell(Default::default()));
        assert_ne!(a, b);
        assert!(matches!(r.get(a), Err(Error::UnknownEntity(_))));
    }

    #[test]
    fn smoke_hides_distant_entities() {
        let (mut grid, mut r) = setup();
        let config = Config::default();
        let near = r.spawn(ivec2(2, 1), EntityState::Relay(Relay::default()));
        let far = r.spawn(ivec2(5, 1), EntityState::Relay(Relay::default()));
        grid.set_hazard(ivec2(2, 1), HazardField::Smoke, 80.0).unwrap();
        grid.set_hazard(ivec2(5, 1), HazardField::Smoke, 80.0).unwrap();

        let q = Query::all();
        let seen: Vec<EntityId> = r
            .query(&grid, &config, ivec2(1, 1), &q)
            .map(|e| e.id)
            .collect();
        assert_eq!(seen, vec![near]);

        r.reveal(far).unwrap();
        assert_eq!(r.query(&grid, &config, ivec2(1, 1), &q).count(), 2);
    }

    #[test]
    fn traces_stay_hidden_until_revealed() {
        let (grid, mut r) = setup();
        let config = Config::default();
        let trace = r.spawn(
            ivec2(3, 2),
            EntityState::EvidenceTrace(EvidenceTrace {
                sensor: SensorType::Trace,
                examined: false,
                clue: None,
            }),
        );
        let q = Query::all().kind(EntityKind::EvidenceTrace);
        assert_eq!(r.query(&grid, &config, ivec2(3, 1), &q).count(), 0);
        r.reveal(trace).unwrap();
        assert_eq!(r.query(&grid, &config, ivec2(3, 1), &q).count(), 1);
    }

    #[test]
    fn filters() {
        let (grid, mut r) = setup();
        let config = Config::default();
        r.spawn(
            ivec2(1, 1),
            EntityState::Relay(Relay {
                activated: true,
                ..Default::default()
            }),
        );
        r.spawn(ivec2(5, 2), EntityState::Relay(Relay::default()));

        let count = |q: Query| r.query(&grid, &config, ivec2(1, 1), &q).count();
        assert_eq!(count(Query::all()), 2);
        assert_eq!(count(Query::all().active_only()), 1);
        assert_eq!(count(Query::all().within(ivec2(1, 1), 1)), 1);
        assert_eq!(count(Query::all().kind(EntityKind::Breach)), 0);
    }
}
