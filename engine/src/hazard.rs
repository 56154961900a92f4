//! Hazard field simulation.

use crate::{prelude::*, EntityState, Room};

/// Steps the heat, smoke, pressure and dirt fields.
///
/// This is the only code that writes hazard values. Every field update
/// reads the previous turn's values and writes a fresh buffer, so the
/// result doesn't depend on the order tiles are visited in.
pub struct HazardPropagator<'a> {
    config: &'a Config,
}

impl<'a> HazardPropagator<'a> {
    pub fn new(config: &'a Config) -> Self {
        HazardPropagator { config }
    }

    /// Advance all hazard fields by one turn.
    pub fn step(
        &self,
        grid: &mut TileGrid,
        rooms: &[Room],
        entities: &EntityRegistry,
        turn: u64,
    ) -> Result<()> {
        let c = self.config;

        self.emit(grid, entities)?;

        self.diffuse(grid, HazardField::Heat, c.heat_diffusion, c.heat_decay)?;

        for p in grid.positions().collect::<Vec<_>>() {
            let tile = grid.get(p)?;
            if tile.is_walkable() && tile.heat() >= c.smoke_ignition_heat {
                let smoke = tile.smoke() + c.smoke_from_heat;
                grid.set_hazard(p, HazardField::Smoke, smoke)?;
            }
        }
        self.diffuse(
            grid,
            HazardField::Smoke,
            c.smoke_diffusion,
            c.smoke_decay,
        )?;

        self.update_pressure(grid, rooms, entities)?;

        if turn > 0 && turn % c.dirt_period.max(1) == 0 {
            for p in grid.positions().collect::<Vec<_>>() {
                if grid.is_walkable(p) {
                    let dirt = grid.hazard(p, HazardField::Dirt)?;
                    grid.set_hazard(p, HazardField::Dirt, dirt + c.dirt_amount)?;
                }
            }
        }

        Ok(())
    }

    /// Point sources and sinks from entities.
    fn emit(&self, grid: &mut TileGrid, entities: &EntityRegistry) -> Result<()> {
        let c = self.config;
        for e in entities.iter() {
            match &e.state {
                EntityState::Relay(r) if r.overloaded && !r.activated => {
                    add(grid, e.pos, HazardField::Heat, c.relay_heat)?;
                    add(grid, e.pos, HazardField::Smoke, c.relay_smoke)?;
                }
                EntityState::Breach(b) if !b.sealed => {
                    add(grid, e.pos, HazardField::Heat, c.breach_heat)?;
                }
                EntityState::ServiceBot(b) if b.activated => {
                    for p in std::iter::once(e.pos).chain(DIR_4.map(|d| e.pos + d))
                    {
                        if grid.is_walkable(p) {
                            add(grid, p, HazardField::Dirt, -c.service_bot_scrub)?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Explicit diffusion over walkable cardinal neighbors with linear
    /// decay. Walls hold no hazard.
    fn diffuse(
        &self,
        grid: &mut TileGrid,
        field: HazardField,
        rate: f32,
        decay: f32,
    ) -> Result<()> {
        let old: Vec<(IVec2, f32)> = grid
            .iter()
            .map(|(p, t)| (p, t.hazards().get(field)))
            .collect();
        let width = grid.width();
        let at = |p: IVec2| old[(p.x + p.y * width) as usize].1;

        let mut new = Vec::with_capacity(old.len());
        for &(p, v) in &old {
            if !grid.is_walkable(p) {
                new.push((p, 0.0));
                continue;
            }
            let flow: f32 = grid.walkable_neighbors(p).map(|q| at(q) - v).sum();
            new.push((p, (v + rate * flow - decay).max(0.0)));
        }

        for (p, v) in new {
            grid.set_hazard(p, field, v)?;
        }
        Ok(())
    }

    /// Tiles within reach of unsealed breaches.
    pub fn breach_zone(
        &self,
        grid: &TileGrid,
        entities: &EntityRegistry,
    ) -> HashSet<IVec2> {
        let is_open = |p: &IVec2| grid.is_walkable(*p);
        let mut zone = HashSet::default();
        for e in entities.iter() {
            if matches!(&e.state, EntityState::Breach(b) if !b.sealed) {
                zone.extend(
                    util::flood_fill_4(&is_open, [e.pos])
                        .take_while(util::within_range(self.config.breach_reach + 1))
                        .map(|(p, _)| p),
                );
            }
        }
        zone
    }

    fn update_pressure(
        &self,
        grid: &mut TileGrid,
        rooms: &[Room],
        entities: &EntityRegistry,
    ) -> Result<()> {
        let c = self.config;
        let zone = self.breach_zone(grid, entities);

        // Valves refill their whole room, except where air is still
        // leaking out.
        let mut refill: HashSet<IVec2> = HashSet::default();
        for e in entities.iter() {
            if matches!(&e.state, EntityState::PressureValve(v) if v.opened) {
                if let Some(room) = rooms.iter().find(|r| r.contains(e.pos)) {
                    refill.extend(room.bounds().iter());
                }
            }
        }

        for p in grid.positions().collect::<Vec<_>>() {
            if !grid.is_walkable(p) {
                continue;
            }
            let pressure = grid.hazard(p, HazardField::Pressure)?;
            if zone.contains(&p) {
                let v = (pressure - c.pressure_loss).max(0.0);
                grid.set_hazard(p, HazardField::Pressure, v)?;
            } else if refill.contains(&p) {
                grid.set_hazard(p, HazardField::Pressure, pressure + c.valve_restore)?;
            }
        }
        Ok(())
    }

    /// Clean tiles, returns how many had dirt removed.
    ///
    /// With `vent` set heat and smoke are knocked down as well.
    pub fn clean(
        &self,
        grid: &mut TileGrid,
        area: impl IntoIterator<Item = IVec2>,
        vent: bool,
    ) -> Result<u32> {
        let amount = self.config.clean_amount;
        let mut cleaned = 0;
        for p in area {
            if !grid.is_walkable(p) {
                continue;
            }
            let dirt = grid.hazard(p, HazardField::Dirt)?;
            if dirt > 0.0 {
                grid.set_hazard(p, HazardField::Dirt, (dirt - amount).max(0.0))?;
                cleaned += 1;
            }
            if vent {
                for field in [HazardField::Heat, HazardField::Smoke] {
                    let v = grid.hazard(p, field)?;
                    grid.set_hazard(p, field, (v - amount / 2.0).max(0.0))?;
                }
            }
        }
        Ok(cleaned)
    }

    /// Whether cleaning the area would change anything.
    pub fn has_work(
        &self,
        grid: &TileGrid,
        area: impl IntoIterator<Item = IVec2>,
        vent: bool,
    ) -> bool {
        area.into_iter().filter(|&p| grid.is_walkable(p)).any(|p| {
            grid.get(p).is_ok_and(|t| {
                t.dirt() > 0.0 || (vent && (t.heat() > 0.0 || t.smoke() > 0.0))
            })
        })
    }
}

fn add(grid: &mut TileGrid, p: IVec2, field: HazardField, amount: f32) -> Result<()> {
    let v = grid.hazard(p, field)?;
    grid.set_hazard(p, field, (v + amount).max(0.0))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use quickcheck_macros::quickcheck;
    use util::AsciiMap;

    use super::*;
    use crate::entity::{Breach, PressureValve, Relay};

    fn grid() -> TileGrid {
        TileGrid::from_ascii(&AsciiMap::new(
            "
            ##########
            #........#
            #........#
            #........#
            ##########",
        ))
    }

    fn room() -> Vec<Room> {
        vec![Room::new(0, "Test Room", Zone::Engineering, Rect::new([1, 1], [8, 3]))]
    }

    #[test]
    fn heat_spreads_and_fades() {
        let config = Config::default();
        let hp = HazardPropagator::new(&config);
        let mut g = grid();
        let r = EntityRegistry::default();
        g.set_hazard(ivec2(4, 2), HazardField::Heat, 100.0).unwrap();

        hp.step(&mut g, &room(), &r, 1).unwrap();
        let center = g.hazard(ivec2(4, 2), HazardField::Heat).unwrap();
        let side = g.hazard(ivec2(5, 2), HazardField::Heat).unwrap();
        assert_eq!(side, 4.0);
        // 4 neighbors at 0, 0.05 * -400 - 1 decay.
        assert_eq!(center, 79.0);

        for t in 2..400 {
            hp.step(&mut g, &room(), &r, t).unwrap();
        }
        for (_, t) in g.iter() {
            assert_eq!(t.heat(), 0.0);
        }
    }

    #[test]
    fn walls_stay_cold() {
        let config = Config::default();
        let hp = HazardPropagator::new(&config);
        let mut g = grid();
        let mut r = EntityRegistry::default();
        r.spawn(
            ivec2(1, 1),
            EntityState::Relay(Relay {
                overloaded: true,
                ..Default::default()
            }),
        );
        for t in 0..50 {
            hp.step(&mut g, &room(), &r, t).unwrap();
        }
        assert!(g.hazard(ivec2(1, 1), HazardField::Heat).unwrap() > 0.0);
        assert!(g.hazard(ivec2(1, 1), HazardField::Smoke).unwrap() > 0.0);
        assert_eq!(g.hazard(ivec2(0, 1), HazardField::Heat).unwrap(), 0.0);
        g.check().unwrap();
    }

    #[test]
    fn breach_drains_nearby_pressure() {
        let config = Config {
            breach_reach: 2,
            ..Default::default()
        };
        let hp = HazardPropagator::new(&config);
        let mut g = grid();
        let mut r = EntityRegistry::default();
        let breach = r.spawn(ivec2(1, 2), EntityState::Breach(Breach::default()));

        hp.step(&mut g, &room(), &r, 1).unwrap();
        let p = |g: &TileGrid, x, y| g.hazard(ivec2(x, y), HazardField::Pressure).unwrap();
        assert_eq!(p(&g, 1, 2), 98.0);
        assert_eq!(p(&g, 3, 2), 98.0);
        assert_eq!(p(&g, 4, 2), 100.0);

        // Sealed breach stops the loss.
        r.mutate(breach, |s| {
            if let EntityState::Breach(b) = s {
                b.sealed = true;
            }
        })
        .unwrap();
        hp.step(&mut g, &room(), &r, 2).unwrap();
        assert_eq!(p(&g, 1, 2), 98.0);

        // Valve refills the room.
        r.spawn(
            ivec2(8, 3),
            EntityState::PressureValve(PressureValve { opened: true }),
        );
        hp.step(&mut g, &room(), &r, 3).unwrap();
        assert_eq!(p(&g, 1, 2), 100.0);
    }

    #[test]
    fn dirt_accumulates_periodically() {
        let config = Config::default();
        let hp = HazardPropagator::new(&config);
        let mut g = grid();
        let r = EntityRegistry::default();
        for t in 1..config.dirt_period {
            hp.step(&mut g, &room(), &r, t).unwrap();
        }
        assert_eq!(g.hazard(ivec2(2, 2), HazardField::Dirt).unwrap(), 0.0);
        hp.step(&mut g, &room(), &r, config.dirt_period).unwrap();
        assert_eq!(
            g.hazard(ivec2(2, 2), HazardField::Dirt).unwrap(),
            config.dirt_amount
        );
    }

    #[test]
    fn cleaning() {
        let config = Config::default();
        let hp = HazardPropagator::new(&config);
        let mut g = grid();
        g.set_hazard(ivec2(2, 2), HazardField::Dirt, 30.0).unwrap();
        g.set_hazard(ivec2(3, 2), HazardField::Heat, 30.0).unwrap();

        let area = [ivec2(2, 2), ivec2(3, 2), ivec2(0, 0)];
        assert!(hp.has_work(&g, area, false));
        assert_eq!(hp.clean(&mut g, area, true).unwrap(), 1);
        assert_eq!(g.hazard(ivec2(2, 2), HazardField::Dirt).unwrap(), 0.0);
        assert_eq!(g.hazard(ivec2(3, 2), HazardField::Heat).unwrap(), 10.0);
        assert!(!hp.has_work(&g, area, false));
    }

    #[quickcheck]
    fn fields_stay_in_range(seeds: Vec<(u8, u8, u8)>) -> bool {
        let config = Config::default();
        let hp = HazardPropagator::new(&config);
        let mut g = grid();
        let mut r = EntityRegistry::default();
        for (i, &(x, y, v)) in seeds.iter().enumerate().take(12) {
            let p = ivec2(1 + x as i32 % 8, 1 + y as i32 % 3);
            let field = [HazardField::Heat, HazardField::Smoke][i % 2];
            g.set_hazard(p, field, v as f32).unwrap();
            if i % 3 == 0 {
                r.spawn(
                    p,
                    EntityState::Relay(Relay {
                        overloaded: true,
                        ..Default::default()
                    }),
                );
            } else if i % 3 == 1 {
                r.spawn(p, EntityState::Breach(Breach::default()));
            }
        }
        for t in 0..30 {
            if hp.step(&mut g, &room(), &r, t).is_err() {
                return false;
            }
        }
        g.check().is_ok()
    }
}
