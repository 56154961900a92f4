use engine::{
    entity::{ClosedDoor, Relay},
    prelude::*,
    EntityState, GameState, Intent, LogKind, SensorType, TurnScheduler,
};
use pretty_assertions::assert_eq;

fn fixture(map: &str) -> GameState {
    GameState::from_ascii(map).unwrap()
}

fn find(s: &GameState, kind: EntityKind) -> EntityId {
    s.entities.iter().find(|e| e.kind() == kind).unwrap().id
}

fn state_of(s: &GameState, id: EntityId) -> EntityState {
    s.entities.get(id).unwrap().state.clone()
}

fn locked_relay() -> EntityState {
    EntityState::Relay(Relay {
        locked: true,
        ..Default::default()
    })
}

#[test]
fn fuse_box_takes_a_power_cell() {
    let mut state = fixture(
        "
        ########
        #c@F...#
        ########",
    );
    let cell = find(&state, EntityKind::PowerCell);
    let fuse = find(&state, EntityKind::FuseBox);
    let relay = state.entities.spawn(ivec2(5, 1), locked_relay());
    let mut sched = TurnScheduler::new(state).unwrap();

    assert!(matches!(
        sched.advance_turn(Intent::Interact(Some(fuse))),
        Err(Error::IllegalIntent(_))
    ));

    // Walking over the cell picks it up.
    let s = sched.advance_turn(Intent::Move(ivec2(-1, 0))).unwrap();
    assert_eq!(s.player.power_cells, 1);
    assert!(s.entities.get(cell).is_err());

    sched.advance_turn(Intent::Move(ivec2(1, 0))).unwrap();
    let s = sched.advance_turn(Intent::Interact(Some(fuse))).unwrap();
    assert_eq!(s.player.power_cells, 0);
    assert!(matches!(state_of(&s, fuse), EntityState::FuseBox(f) if f.powered));
    assert!(matches!(state_of(&s, relay), EntityState::Relay(r) if !r.locked));
    assert_eq!(s.turn, 3);
}

#[test]
fn security_terminal_releases_locks() {
    let mut state = fixture(
        "
        #########
        #@S..=..#
        #########",
    );
    let terminal = find(&state, EntityKind::SecurityTerminal);
    let door = state.entities.spawn(
        ivec2(3, 1),
        EntityState::ClosedDoor(ClosedDoor {
            open: false,
            locked: true,
        }),
    );
    let relay = state.entities.spawn(ivec2(7, 1), locked_relay());
    assert!(!state.tiles.is_walkable(ivec2(5, 1)));
    let mut sched = TurnScheduler::new(state).unwrap();

    let s = sched.advance_turn(Intent::Interact(Some(terminal))).unwrap();
    assert!(matches!(
        state_of(&s, terminal),
        EntityState::SecurityTerminal(t) if t.activated
    ));
    assert!(matches!(
        state_of(&s, door),
        EntityState::ClosedDoor(d) if !d.locked && !d.open
    ));
    assert!(matches!(state_of(&s, relay), EntityState::Relay(r) if !r.locked));
    assert_eq!(s.tiles.get(ivec2(5, 1)).unwrap().kind(), TileType::Door);
    assert!(s.tiles.is_walkable(ivec2(5, 1)));
}

#[test]
fn drone_marks_room_contents() {
    let state = fixture(
        "
        ######
        #@d.e#
        ######",
    );
    let drone = find(&state, EntityKind::Drone);
    let trace = find(&state, EntityKind::EvidenceTrace);
    let mut sched = TurnScheduler::new(state).unwrap();

    let s = sched.state();
    assert!(!s.is_perceived(s.entities.get(trace).unwrap()));

    let s = sched.advance_turn(Intent::Interact(Some(drone))).unwrap();
    assert!(matches!(state_of(&s, drone), EntityState::Drone(d) if d.activated));
    let e = s.entities.get(trace).unwrap();
    assert!(e.revealed);
    assert!(s.is_perceived(e));
}

#[test]
fn active_sensor_finds_traces() {
    let state = fixture(
        "
        #########
        #@s....e#
        #########",
    );
    let trace = find(&state, EntityKind::EvidenceTrace);
    let mut sched = TurnScheduler::new(state).unwrap();

    assert!(matches!(
        sched.advance_turn(Intent::ToggleSensor(SensorType::Trace)),
        Err(Error::IllegalIntent(_))
    ));

    let s = sched.advance_turn(Intent::Move(ivec2(1, 0))).unwrap();
    assert!(s.player.has_sensor(SensorType::Trace));
    assert!(!s.entities.get(trace).unwrap().revealed);

    let s = sched
        .advance_turn(Intent::ToggleSensor(SensorType::Trace))
        .unwrap();
    assert_eq!(s.player.active_sensor, Some(SensorType::Trace));
    assert!(s.entities.get(trace).unwrap().revealed);
    assert!(s.logs.iter().any(|e| e.kind == LogKind::Evidence));
}

#[test]
fn patrol_drone_stuns_on_contact() {
    let state = fixture(
        "
        ########
        #X..@..#
        ########",
    );
    let drone = find(&state, EntityKind::PatrolDrone);
    let mut sched = TurnScheduler::new(state).unwrap();

    let s = sched.advance_turn(Intent::Wait).unwrap();
    assert_eq!(s.entities.get(drone).unwrap().pos, ivec2(2, 1));
    assert_eq!(s.player.stun_turns, 0);

    let s = sched.advance_turn(Intent::Wait).unwrap();
    assert_eq!(s.entities.get(drone).unwrap().pos, ivec2(3, 1));
    assert_eq!(s.player.stun_turns, 2);

    // The step is swallowed but the turn still passes.
    let s = sched.advance_turn(Intent::Move(ivec2(1, 0))).unwrap();
    assert_eq!(s.player.pos, ivec2(4, 1));
    assert_eq!(s.turn, 3);
    assert_eq!(s.player.stun_turns, 1);
}

#[test]
fn disabled_patrol_drone_stays_put() {
    let state = fixture(
        "
        #######
        #@X...#
        #######",
    );
    let drone = find(&state, EntityKind::PatrolDrone);
    let mut sched = TurnScheduler::new(state).unwrap();

    let s = sched.advance_turn(Intent::Interact(Some(drone))).unwrap();
    assert!(matches!(
        state_of(&s, drone),
        EntityState::PatrolDrone(d) if d.disabled
    ));
    assert_eq!(s.player.stun_turns, 0);

    let s = sched.advance_turn(Intent::Wait).unwrap();
    assert_eq!(s.entities.get(drone).unwrap().pos, ivec2(2, 1));
    assert_eq!(s.player.stun_turns, 0);
}

#[test]
fn repair_bot_seals_nearby_breach() {
    let state = fixture(
        "
        #########
        #@r.....#
        #..B....#
        #########",
    );
    let bot = find(&state, EntityKind::RepairBot);
    let breach = find(&state, EntityKind::Breach);
    let mut sched = TurnScheduler::new(state).unwrap();

    let s = sched.advance_turn(Intent::Wait).unwrap();
    assert!(matches!(state_of(&s, breach), EntityState::Breach(b) if !b.sealed));

    let s = sched.advance_turn(Intent::Interact(Some(bot))).unwrap();
    assert!(matches!(state_of(&s, bot), EntityState::RepairBot(b) if b.activated));
    assert!(matches!(state_of(&s, breach), EntityState::Breach(b) if b.sealed));
    assert!(s.entities.get(bot).unwrap().is_exhausted());
}
