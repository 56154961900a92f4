use engine::{
    entity::CrewNpc, prelude::*, EntityState, GameState, Intent, ObjectivePhase,
    TurnScheduler, Vitals,
};
use pretty_assertions::assert_eq;

fn fixture(map: &str) -> GameState {
    GameState::from_ascii(map).unwrap()
}

fn find(s: &GameState, kind: EntityKind) -> EntityId {
    s.entities.iter().find(|e| e.kind() == kind).unwrap().id
}

fn spawn_crew(s: &mut GameState, pos: IVec2, following: bool) -> EntityId {
    s.entities.spawn(
        pos,
        EntityState::CrewNpc(CrewNpc {
            name: format!("Tech {}", pos.x),
            found: following,
            following,
            vitals: Vitals::new(6),
            ..Default::default()
        }),
    )
}

fn crew(s: &GameState, id: EntityId) -> CrewNpc {
    match &s.entities.get(id).unwrap().state {
        EntityState::CrewNpc(c) => c.clone(),
        other => panic!("{id} is a {other:?}"),
    }
}

#[test]
fn data_core_transmission_wins() {
    let mut state = fixture(
        "
        #######
        #@D...#
        #.....#
        #######",
    );
    let core = find(&state, EntityKind::DataCore);
    let left_behind = spawn_crew(&mut state, ivec2(5, 2), false);

    // Power isn't back yet.
    let mut early = TurnScheduler::new(state.clone()).unwrap();
    assert!(matches!(
        early.advance_turn(Intent::Interact(Some(core))),
        Err(Error::IllegalIntent(_))
    ));
    assert!(!early.state().game_over);
    assert_eq!(early.state().turn, 0);

    state.mystery.objective_phase = ObjectivePhase::Recover;
    let mut sched = TurnScheduler::new(state).unwrap();
    let s = sched.advance_turn(Intent::Interact(Some(core))).unwrap();
    assert!(s.game_over);
    assert!(s.victory);

    // Crew still aboard at the end are lost.
    assert_eq!(s.mystery.evacuation.crew_dead, vec![left_behind]);
    assert!(s.mystery.evacuation.crew_evacuated.is_empty());
    assert!(crew(&s, left_behind).dead);

    assert!(matches!(sched.advance_turn(Intent::Wait), Err(Error::GameOver)));
    assert_eq!(sched.state().turn, 1);
}

#[test]
fn escape_pod_evacuation_wins() {
    let mut state = fixture(
        "
        ########
        #..@P..#
        #......#
        ########",
    );
    let pod = find(&state, EntityKind::EscapePod);
    let a = spawn_crew(&mut state, ivec2(2, 1), true);
    let b = spawn_crew(&mut state, ivec2(2, 2), true);

    state.mystery.objective_phase = ObjectivePhase::Recover;
    let mut early = TurnScheduler::new(state.clone()).unwrap();
    assert!(matches!(
        early.advance_turn(Intent::Interact(Some(pod))),
        Err(Error::IllegalIntent(_))
    ));

    state.mystery.objective_phase = ObjectivePhase::Evacuate;
    let mut sched = TurnScheduler::new(state).unwrap();
    let s = sched.advance_turn(Intent::Interact(Some(pod))).unwrap();

    assert_eq!(s.mystery.evacuation.crew_evacuated, vec![a, b]);
    assert!(s.mystery.evacuation.crew_dead.is_empty());
    assert!(crew(&s, a).evacuated && crew(&s, b).evacuated);
    match &s.entities.get(pod).unwrap().state {
        EntityState::EscapePod(p) => {
            assert!(p.launched);
            assert_eq!(p.boarded, vec![a, b]);
        }
        other => panic!("pod turned into {other:?}"),
    }
    assert!(s.game_over);
    assert!(s.victory);
}

#[test]
fn airlock_evacuation_is_one_way() {
    let mut state = fixture(
        "
        #######
        #.@A..#
        #.....#
        #######",
    );
    let airlock = find(&state, EntityKind::Airlock);
    let leaving = spawn_crew(&mut state, ivec2(2, 2), true);
    let staying = spawn_crew(&mut state, ivec2(5, 2), false);
    state.mystery.objective_phase = ObjectivePhase::Evacuate;
    let mut sched = TurnScheduler::new(state).unwrap();

    let s = sched.advance_turn(Intent::Interact(Some(airlock))).unwrap();
    assert_eq!(s.mystery.evacuation.crew_evacuated, vec![leaving]);
    assert!(!s.game_over);

    for _ in 0..3 {
        sched.advance_turn(Intent::Wait).unwrap();
    }
    let s = sched.state();
    assert_eq!(s.mystery.evacuation.crew_evacuated, vec![leaving]);
    assert!(s.mystery.evacuation.crew_dead.is_empty());
    assert!(crew(&s, leaving).evacuated);
    assert!(!crew(&s, leaving).following);
    assert!(crew(&s, staying).is_aboard());
}

#[test]
fn evacuating_too_few_crew_loses() {
    let mut state = fixture(
        "
        #######
        #.@A..#
        #.....#
        #######",
    );
    let airlock = find(&state, EntityKind::Airlock);
    let only = spawn_crew(&mut state, ivec2(2, 2), true);
    state.mystery.objective_phase = ObjectivePhase::Evacuate;
    let mut sched = TurnScheduler::new(state).unwrap();

    // Everyone is accounted for but the evacuation goal is two.
    let s = sched.advance_turn(Intent::Interact(Some(airlock))).unwrap();
    assert_eq!(s.mystery.evacuation.crew_evacuated, vec![only]);
    assert!(s.game_over);
    assert!(!s.victory);
    assert!(s.mystery.evacuation.crew_dead.is_empty());
}

#[test]
fn airlock_needs_evacuation_phase() {
    let mut state = fixture(
        "
        #######
        #.@A..#
        #.....#
        #######",
    );
    let airlock = find(&state, EntityKind::Airlock);
    spawn_crew(&mut state, ivec2(2, 2), true);
    let mut sched = TurnScheduler::new(state).unwrap();

    assert!(matches!(
        sched.advance_turn(Intent::Interact(Some(airlock))),
        Err(Error::IllegalIntent(_))
    ));
    let s = sched.state();
    assert!(s.mystery.evacuation.crew_evacuated.is_empty());
    assert_eq!(s.turn, 0);
}

#[test]
fn cleaning_opens_investigation() {
    let mut state = fixture(
        "
        #####
        #...#
        #.@.#
        #...#
        #####",
    );
    for y in 1..4 {
        for x in 1..4 {
            state.tiles.set_hazard(ivec2(x, y), HazardField::Dirt, 30.0).unwrap();
        }
    }
    let mut sched = TurnScheduler::new(state).unwrap();
    assert_eq!(sched.state().mystery.objective_phase, ObjectivePhase::Clean);

    let s = sched.advance_turn(Intent::Clean).unwrap();
    assert_eq!(s.stats.tiles_cleaned, 9);
    assert_eq!(s.mystery.objective_phase, ObjectivePhase::Investigate);
    assert!(s.logs.iter().any(|e| e.text.starts_with("New objective")));
}

#[test]
fn relays_open_recovery() {
    let mut state = fixture(
        "
        #######
        #R@R..#
        #######",
    );
    let relays: Vec<EntityId> = state
        .entities
        .iter()
        .filter(|e| e.kind() == EntityKind::Relay)
        .map(|e| e.id)
        .collect();
    state.mystery.objective_phase = ObjectivePhase::Investigate;
    let mut sched = TurnScheduler::new(state).unwrap();

    let s = sched.advance_turn(Intent::Interact(Some(relays[0]))).unwrap();
    assert_eq!(s.mystery.objective_phase, ObjectivePhase::Investigate);

    let s = sched.advance_turn(Intent::Interact(Some(relays[1]))).unwrap();
    assert_eq!(s.mystery.objective_phase, ObjectivePhase::Recover);

    // No correct deductions yet, so the phase holds.
    let s = sched.advance_turn(Intent::Wait).unwrap();
    assert_eq!(s.mystery.objective_phase, ObjectivePhase::Recover);
    assert!(!s.game_over);
}
