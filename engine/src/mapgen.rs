//! Procedural station generation.

use rand::prelude::*;
use util::{astar_path, flood_fill_4, RngExt};

use crate::{
    entity::*, msg, prelude::*, scenario, Attachment, EntityState, GameState,
    LogKind, Room, SensorType, WorldSpec,
};

/// Fewer rooms than this can't hold the story.
const MIN_ROOMS: usize = 6;

/// Room and corridor layout parameters.
#[derive(Copy, Clone, Debug)]
pub struct StationPlan {
    pub width: i32,
    pub height: i32,
}

/// Carved terrain and the floor rectangles of its rooms.
///
/// The first room is the start room and the last one the data vault.
pub struct Layout {
    pub grid: TileGrid,
    pub rooms: Vec<Rect>,
}

impl Distribution<Layout> for StationPlan {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Layout {
        let area = Rect::new([1, 1], [self.width - 2, self.height - 2]);
        let mut rooms: Vec<Rect> = Vec::new();

        for _ in 0..500 {
            if rooms.len() == scenario::ROOMS.len() {
                break;
            }
            let dim = ivec2(rng.gen_range(5..=9), rng.gen_range(4..=6));
            let span = area.dim - dim;
            if span.x < 0 || span.y < 0 {
                break;
            }
            let min = area.min
                + ivec2(rng.gen_range(0..=span.x), rng.gen_range(0..=span.y));
            let room = Rect::new(min, dim);
            // Keep walls between rooms thick enough for corridors.
            if rooms.iter().any(|r| r.grow(2).intersects(&room)) {
                continue;
            }
            rooms.push(room);
        }

        // West to east, so the chain of corridors doesn't double back.
        rooms.sort_by_key(|r| (r.center().x, r.center().y));

        let mut grid = TileGrid::new(self.width, self.height);
        for p in rooms.iter().flat_map(|r| r.iter()) {
            let _ = grid.set_kind(p, TileType::Floor);
        }
        for i in 1..rooms.len() {
            connect(&mut grid, &rooms, i - 1, i);
        }

        Layout { grid, rooms }
    }
}

/// Carve a corridor between two rooms.
fn connect(grid: &mut TileGrid, rooms: &[Rect], a: usize, b: usize) {
    let area = grid.bounds().grow(-1);
    let (ra, rb) = (rooms[a], rooms[b]);
    let others: Vec<Rect> = rooms
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != a && i != b)
        .map(|(_, r)| r.grow(1))
        .collect();

    let path = astar_path(
        &ra.center(),
        &rb.center(),
        |&p| {
            let others = &others;
            DIR_4.map(|d| p + d).into_iter().filter(move |&q| {
                area.contains(q) && !others.iter().any(|r| r.contains(q))
            })
        },
        |p, q| (*q - *p).taxi_len() as usize,
    )
    .unwrap_or_else(|| {
        // Boxed in by other rooms, dig straight through instead.
        let (p, q) = (ra.center(), rb.center());
        let corner = ivec2(q.x, p.y);
        line(p, corner).chain(line(corner, q)).collect()
    });

    for p in path {
        let Ok(tile) = grid.get(p) else { continue };
        if tile.kind() != TileType::Wall {
            continue;
        }
        let in_ring = rooms.iter().any(|r| r.grow(1).contains(p));
        let kind = if in_ring {
            TileType::Door
        } else {
            TileType::Corridor
        };
        let _ = grid.set_kind(p, kind);
    }
}

/// Straight axis-aligned line of points, both ends included.
fn line(a: IVec2, b: IVec2) -> impl Iterator<Item = IVec2> {
    let step = (b - a).signum();
    let n = (b - a).taxi_len();
    (0..=n).map(move |i| a + step * i)
}

/// Lock the vault doors, unless that would cut off other rooms.
fn seal_vault(grid: &mut TileGrid, rooms: &[Rect]) {
    let (Some(start), Some(vault)) = (rooms.first(), rooms.last()) else {
        return;
    };
    let doors: Vec<IVec2> = vault
        .grow(1)
        .iter()
        .filter(|&p| {
            grid.get(p).is_ok_and(|t| t.kind() == TileType::Door)
        })
        .collect();
    for &p in &doors {
        let _ = grid.set_kind(p, TileType::LockedDoor);
    }

    let reachable: HashSet<IVec2> = {
        let is_open = |p: &IVec2| grid.is_walkable(*p);
        flood_fill_4(&is_open, [start.center()])
            .map(|(p, _)| p)
            .collect()
    };
    let cut_off = rooms[..rooms.len() - 1]
        .iter()
        .any(|r| !reachable.contains(&r.center()));
    if cut_off {
        log::debug!("vault doors would cut off the station, leaving open");
        for &p in &doors {
            let _ = grid.set_kind(p, TileType::Door);
        }
    }
}

/// Places entities into rooms without blocking passage.
struct Placer<'a, R: ?Sized> {
    state: &'a mut GameState,
    rooms: &'a [Rect],
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Placer<'_, R> {
    fn is_free(&self, p: IVec2) -> bool {
        p != self.state.player.pos
            && self.state.tiles.is_walkable(p)
            && self.state.entities.at(p).next().is_none()
    }

    /// Spawn into the given room or the next one with space.
    fn place(&mut self, room: usize, state: EntityState) -> Option<EntityId> {
        let n = self.rooms.len();
        for i in 0..n {
            let rect = self.rooms[(room + i) % n];
            // Blockers keep off the room's edge so its rim stays walkable.
            let cells = if state.blocks_movement() {
                rect.grow(-1)
            } else {
                rect
            };
            let mut spots: Vec<IVec2> =
                cells.iter().filter(|&p| self.is_free(p)).collect();
            spots.shuffle(self.rng);
            if let Some(&p) = spots.first() {
                return Some(self.state.entities.spawn(p, state));
            }
        }
        log::warn!("no room left for a {}", state.kind().noun());
        None
    }
}

/// Fill a layout with the player, hazards, story and entities.
fn populate(
    layout: Layout,
    spec: &WorldSpec,
    config: Config,
    rng: &mut (impl Rng + ?Sized),
) -> GameState {
    let Layout { mut grid, rooms } = layout;
    seal_vault(&mut grid, &rooms);

    let start = rooms[0];
    let mut state =
        GameState::new(config, grid, spec.archetype.player(start.center()));
    state.mystery = scenario::mystery();

    let vault = rooms.len() - 1;
    for (i, r) in rooms.iter().enumerate() {
        let (name, zone) = if i == vault {
            scenario::ROOMS[scenario::ROOMS.len() - 1]
        } else {
            scenario::ROOMS[i]
        };
        state.rooms.push(Room::new(i as u32, name, zone, *r));
    }

    // Grime everywhere, worst where the player starts.
    for p in state.tiles.positions().collect::<Vec<_>>() {
        if !state.tiles.is_walkable(p) {
            continue;
        }
        let dirt = if start.contains(p) {
            rng.gen_range(20.0..60.0)
        } else if rng.one_chance_in(3) {
            rng.gen_range(5.0..40.0)
        } else {
            continue;
        };
        let _ = state.tiles.set_hazard(p, HazardField::Dirt, dirt);
    }

    let mut clues = scenario::clue_carriers().into_iter();
    let mut clue = move || clues.next();

    let mut placer = Placer {
        state: &mut state,
        rooms: &rooms,
        rng,
    };

    placer.place(0, EntityState::ServiceBot(Default::default()));
    placer.place(0, EntityState::RepairCradle(RepairCradle { charges: 2 }));
    placer.place(vault, scenario::data_core());

    // Everything else cycles through the rooms between start and vault.
    let mids = vault - 1;
    let mid = |i: usize| 1 + i % mids;

    let [okafor, vasquez, lin] = scenario::CREW;
    let mut table: Vec<(usize, EntityState)> = vec![
        (0, EntityState::Relay(Relay {
            overloaded: true,
            ..Default::default()
        })),
        (0, EntityState::SensorPickup(SensorPickup {
            sensor: SensorType::Thermal,
        })),
        (0, EntityState::MedKit(MedKit {
            heal: config.medkit_heal,
        })),
        (1, EntityState::Relay(Relay {
            locked: true,
            ..Default::default()
        })),
        (1, EntityState::FuseBox(Default::default())),
        (1, scenario::crew(okafor)),
        (2, EntityState::Breach(Default::default())),
        (2, EntityState::PressureValve(Default::default())),
        (2, EntityState::SecurityTerminal(Default::default())),
        (2, EntityState::PowerCell(Default::default())),
        (3, EntityState::Relay(Default::default())),
        (3, EntityState::Drone(Default::default())),
        (3, scenario::crew(vasquez)),
        (3, EntityState::SensorPickup(SensorPickup {
            sensor: SensorType::Trace,
        })),
        (4, EntityState::Breach(Default::default())),
        (4, EntityState::EscapePod(EscapePod {
            capacity: 2,
            ..Default::default()
        })),
        (4, EntityState::Airlock(Default::default())),
        (4, EntityState::UtilityPickup(UtilityPickup {
            attachment: Attachment::HeatShield,
        })),
        (5, scenario::crew(lin)),
        (5, EntityState::PatrolDrone(PatrolDrone {
            disabled: false,
            heading: ivec2(1, 0),
        })),
        (5, EntityState::RepairBot(Default::default())),
        (6, EntityState::ToolPickup(ToolPickup {
            attachment: Attachment::Extinguisher,
        })),
        (6, EntityState::MedKit(MedKit {
            heal: config.medkit_heal,
        })),
        (6, EntityState::SensorPickup(SensorPickup {
            sensor: SensorType::Atmospheric,
        })),
    ];
    // Clues go where their story happened.
    for room in [0, 1, 2, 3, 4, 5, 5] {
        if let Some(c) = clue() {
            table.push((room, c));
        }
    }

    for (room, state) in table {
        placer.place(mid(room), state);
    }

    let name = &state.rooms[0].name;
    msg!(
        state.logs,
        LogKind::Story,
        "Maintenance unit online in the {name}. The station is silent."
    );
    msg!(state.logs, LogKind::System, "Objective: {}", state.mystery.objective_phase.objective());
    state
}

/// Generate a new station from a world spec.
pub fn generate(spec: &WorldSpec, config: Config) -> Result<GameState> {
    spec.validate()?;
    config.validate()?;

    let mut rng = util::srng(&spec.seed);
    let plan = StationPlan {
        width: spec.width,
        height: spec.height,
    };

    for attempt in 0..16 {
        let layout: Layout = rng.sample(plan);
        if layout.rooms.len() < MIN_ROOMS {
            log::debug!("attempt {attempt}: only {} rooms", layout.rooms.len());
            continue;
        }
        let state = populate(layout, spec, config, &mut rng);
        let complete = scenario::REQUIRED
            .iter()
            .all(|&k| state.entities.iter().any(|e| e.kind() == k));
        if complete {
            log::info!(
                "generated station {} with {} rooms and {} entities",
                spec.seed,
                state.rooms.len(),
                state.entities.len()
            );
            return Ok(state);
        }
        log::debug!("attempt {attempt}: required entities missing");
    }

    Err(Error::Config(format!(
        "can't fit a station into {}x{}",
        spec.width, spec.height
    )))
}
