use engine::{
    prelude::*, save, Deduction, DeductionEngine, EntityState, Evidence,
    GameState, Intent, Mystery, ObjectivePhase, SensorType, TurnScheduler,
    WorldSpec, FIELD_MAX, HEAT_MAX,
};
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use util::Logos;

fn scheduler(map: &str) -> TurnScheduler {
    TurnScheduler::new(GameState::from_ascii(map).unwrap()).unwrap()
}

fn station(seed: &str) -> TurnScheduler {
    TurnScheduler::generate(
        &WorldSpec::new(Logos::new(seed)),
        Config::default(),
    )
    .unwrap()
}

/// Turn arbitrary bytes into a plausible stream of player commands.
fn intents(codes: &[u8]) -> Vec<Intent> {
    codes
        .iter()
        .take(40)
        .map(|&c| match c % 10 {
            n @ 0..=3 => Intent::Move(DIR_4[n as usize]),
            4 => Intent::Interact(None),
            5 => Intent::Wait,
            6 => Intent::Clean,
            7 => Intent::ToggleSensor(SensorType::Cleanliness),
            8 => Intent::Answer {
                deduction: "breach-cause".into(),
                answer: "deliberate cut from inside".into(),
            },
            _ => Intent::Move(DIR_4[(c / 10 % 4) as usize]),
        })
        .collect()
}

/// Play intents, failing on anything but ordinary rejections.
fn play(
    sched: &mut TurnScheduler,
    intents: &[Intent],
    mut each: impl FnMut(&GameState),
) {
    for i in intents {
        match sched.advance_turn(i.clone()) {
            Ok(s) => each(&s),
            Err(Error::GameOver) => break,
            Err(e) if e.is_rejection() => {}
            Err(e) => panic!("{i} broke the game: {e}"),
        }
    }
}

#[test]
fn move_onto_free_floor() {
    let mut sched = scheduler(
        "
        ############
        #..........#
        #..........#
        #..........#
        #..........#
        #....@.....#
        #..........#
        ############",
    );
    assert_eq!(sched.state().player.pos, ivec2(5, 5));
    assert_eq!(sched.state().turn, 0);

    let s = sched.advance_turn(Intent::Move(ivec2(1, 0))).unwrap();
    assert_eq!(s.player.pos, ivec2(6, 5));
    assert_eq!(s.turn, 1);
    assert!(s.tiles.get(ivec2(6, 5)).unwrap().is_visible());
}

#[test]
fn relay_activates_once() {
    let mut sched = scheduler(
        "
        ######
        #@R..#
        ######",
    );
    let relay = |s: &GameState| {
        s.entities
            .iter()
            .find_map(|e| match &e.state {
                EntityState::Relay(r) => Some(r.clone()),
                _ => None,
            })
            .unwrap()
    };
    assert!(!relay(&sched.state()).activated);
    assert!(!relay(&sched.state()).locked);

    let s = sched.advance_turn(Intent::Interact(None)).unwrap();
    let after = relay(&s);
    assert!(after.activated);
    let turn = s.turn;

    let ret = sched.advance_turn(Intent::Interact(None));
    assert!(matches!(ret, Err(ref e) if e.is_rejection()));
    let s = sched.state();
    assert_eq!(relay(&s), after);
    assert_eq!(s.turn, turn);
}

#[test]
fn standing_in_heat_hurts() {
    let mut state = GameState::from_ascii(
        "
        #########
        #.......#
        #.......#
        #...@...#
        #.......#
        #.......#
        #########",
    )
    .unwrap();
    assert_eq!(state.config.heat_pain_threshold, 50.0);
    for p in state.tiles.positions().collect::<Vec<_>>() {
        if state.tiles.is_walkable(p) {
            state.tiles.set_hazard(p, HazardField::Heat, 80.0).unwrap();
        }
    }
    let mut sched = TurnScheduler::new(state).unwrap();
    let hp = sched.state().player.hp();

    let mut hps = Vec::new();
    for _ in 0..3 {
        let s = sched.advance_turn(Intent::Wait).unwrap();
        assert!(s.tiles.hazard(s.player.pos, HazardField::Heat).unwrap() > 50.0);
        hps.push(s.player.hp());
    }
    assert!(hps.iter().any(|&h| h < hp));
}

#[test]
fn deduction_unlocks_on_last_evidence() {
    let evidence = |id: &str| Evidence {
        id: id.into(),
        text: format!("Evidence {id}"),
        room_id: None,
        entity_id: None,
    };

    let mut mystery = Mystery {
        deductions: vec![Deduction::new(
            "who",
            ["e1", "e2", "e3"],
            "Who did it?",
            ["Someone", "Nobody"],
            "Someone",
        )],
        ..Default::default()
    };
    DeductionEngine::record(&mut mystery, evidence("e1"));
    DeductionEngine::record(&mut mystery, evidence("e2"));
    assert_eq!(DeductionEngine::unlocked(&mystery).count(), 0);

    DeductionEngine::record(&mut mystery, evidence("e3"));
    let ids: Vec<&str> =
        DeductionEngine::unlocked(&mystery).map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["who"]);

    assert_eq!(DeductionEngine::answer(&mut mystery, "who", "nobody").ok(), Some(false));
    assert!(matches!(
        DeductionEngine::answer(&mut mystery, "who", "someone"),
        Err(Error::AlreadyAnswered { correct: false, .. })
    ));
    assert!(!mystery.deductions[0].answered_correctly);
    assert_eq!(DeductionEngine::unlocked(&mystery).count(), 0);
}

#[test]
fn sealed_breach_stops_pressure_loss() {
    let mut sched = scheduler(
        "
        ##########
        #@B......#
        #........#
        ##########",
    );
    let spot = ivec2(4, 2);

    let before = sched.state().tiles.hazard(spot, HazardField::Pressure).unwrap();
    sched.advance_turn(Intent::Wait).unwrap();
    sched.advance_turn(Intent::Wait).unwrap();
    let leaking = sched.state().tiles.hazard(spot, HazardField::Pressure).unwrap();
    assert!(leaking < before);

    let s = sched.advance_turn(Intent::Interact(None)).unwrap();
    assert!(s
        .entities
        .iter()
        .any(|e| matches!(&e.state, EntityState::Breach(b) if b.sealed)));
    let sealed = s.tiles.clone();

    for _ in 0..3 {
        sched.advance_turn(Intent::Wait).unwrap();
    }
    let s = sched.state();
    for p in s.tiles.positions() {
        assert_eq!(
            s.tiles.hazard(p, HazardField::Pressure).unwrap(),
            sealed.hazard(p, HazardField::Pressure).unwrap(),
            "pressure changed at {p}"
        );
    }
}

#[test]
fn generated_game_survives_save() {
    let mut sched = station("save test");
    play(&mut sched, &intents(&[0, 1, 2, 3, 4, 5, 6, 7, 1, 1, 2]), |_| {});

    let s = sched.state();
    let text = save::state_to_string(&s).unwrap();
    let loaded = save::state_from_str(&text).unwrap();
    assert_eq!(&loaded, s.as_ref());
    assert_eq!(save::state_to_string(&loaded).unwrap(), text);

    // The loaded game continues exactly like the original.
    let mut a = sched;
    let mut b = TurnScheduler::new(loaded).unwrap();
    let rest = intents(&[2, 2, 1, 5, 4, 6, 0, 3]);
    play(&mut a, &rest, |_| {});
    play(&mut b, &rest, |_| {});
    assert_eq!(
        save::state_to_string(&a.state()).unwrap(),
        save::state_to_string(&b.state()).unwrap()
    );
}

#[test]
fn replay_rebuilds_game() {
    let spec = WorldSpec::new(Logos::new("replay"));
    let mut sched = TurnScheduler::generate(&spec, Config::default()).unwrap();
    let mut replay = engine::Replay::new(spec, Config::default());
    for i in intents(&[1, 1, 2, 5, 4, 6, 3, 0, 7]) {
        replay.push(i.clone());
        let _ = sched.advance_turn(i);
    }
    assert_eq!(&replay.run().unwrap(), sched.state().as_ref());
}

#[quickcheck]
fn turns_are_deterministic(codes: Vec<u8>) -> bool {
    let intents = intents(&codes);
    let mut a = station("determinism");
    let mut b = station("determinism");
    play(&mut a, &intents, |_| {});
    play(&mut b, &intents, |_| {});
    save::state_to_string(&a.state()).unwrap()
        == save::state_to_string(&b.state()).unwrap()
}

#[quickcheck]
fn hazards_stay_in_bounds(codes: Vec<u8>) -> bool {
    let mut ok = true;
    play(&mut station("hazards"), &intents(&codes), |s| {
        ok &= s.tiles.check().is_ok();
        for (p, _) in s.tiles.iter() {
            ok &= s.tiles.hazard(p, HazardField::Heat).unwrap() <= HEAT_MAX
                && s.tiles.hazard(p, HazardField::Smoke).unwrap() <= FIELD_MAX;
        }
    });
    ok
}

#[quickcheck]
fn explored_tiles_stay_explored(codes: Vec<u8>) -> bool {
    let mut sched = station("exploration");
    let mut explored: HashSet<IVec2> = sched
        .state()
        .tiles
        .iter()
        .filter(|(_, t)| t.is_explored())
        .map(|(p, _)| p)
        .collect();
    let mut ok = true;
    play(&mut sched, &intents(&codes), |s| {
        ok &= explored
            .iter()
            .all(|&p| s.tiles.get(p).is_ok_and(|t| t.is_explored()));
        explored.extend(
            s.tiles.iter().filter(|(_, t)| t.is_explored()).map(|(p, _)| p),
        );
    });
    ok
}

#[quickcheck]
fn phases_only_advance(codes: Vec<u8>) -> bool {
    let mut phase = ObjectivePhase::Clean;
    let mut ok = true;
    play(&mut station("phases"), &intents(&codes), |s| {
        ok &= s.mystery.objective_phase >= phase;
        phase = s.mystery.objective_phase;
    });
    ok
}
