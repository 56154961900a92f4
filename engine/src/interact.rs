//! What happens when the player uses an entity.

use crate::{
    entity::{ToolPickup, UtilityPickup},
    msg,
    prelude::*,
    AttachmentSlot, Clue, DeductionEngine, Entity, EntityState, Evidence,
    GameState, LogKind, ObjectivePhase, ObjectivePhaseController, Query,
};

/// Resolve the entity an interact intent is aimed at.
///
/// Targets must be perceived and within one step of the player, the
/// player's own tile included. Without an explicit target the first usable
/// entity in id order is picked.
pub(crate) fn target(s: &GameState, id: Option<EntityId>) -> Result<EntityId> {
    if let Some(id) = id {
        let e = s.entities.get(id)?;
        if (e.pos - s.player.pos).king_len() > 1 || !s.is_perceived(e) {
            return illegal(format!("The {} is out of reach.", e.name()));
        }
        return Ok(id);
    }

    let reach = Query::all().within(s.player.pos, 1);
    let mut spent = None;
    for e in s.perceived(&reach) {
        if !e.is_exhausted() {
            return Ok(e.id);
        }
        spent.get_or_insert(e.id);
    }
    match spent {
        Some(id) => Ok(id),
        None => illegal("There's nothing here to use."),
    }
}

/// Apply the effect of using an entity.
///
/// All checks happen before anything is changed, so a rejected
/// interaction leaves the state untouched.
pub(crate) fn interact(s: &mut GameState, id: EntityId) -> Result<()> {
    let e = s.entities.get(id)?.clone();
    let name = e.name();
    if e.is_exhausted() {
        return illegal(format!("The {name} has nothing more to offer."));
    }

    let config = s.config;
    let phase = s.mystery.objective_phase;
    let mut state = e.state.clone();
    let mut consumed = false;

    match &mut state {
        EntityState::Relay(r) => {
            if r.locked {
                return illegal(format!(
                    "The {name} is locked out. It needs a powered fuse box \
                     or a security override."
                ));
            }
            r.activated = true;
            r.overloaded = false;
            let (online, total) = relay_count(s);
            msg!(
                s.logs,
                LogKind::Info,
                "You reroute the {name}. {}/{total} relays online.",
                online + 1
            );
        }

        EntityState::SensorPickup(p) => {
            s.player.sensors.insert(p.sensor.flag());
            consumed = true;
            msg!(
                s.logs,
                LogKind::Info,
                "You install the {} sensor.",
                p.sensor
            );
        }

        EntityState::DataCore(c) => {
            if phase < ObjectivePhase::Recover {
                return illegal(
                    "The data core refuses to transmit until station power \
                     is restored.",
                );
            }
            c.transmitted = true;
            msg!(s.logs, LogKind::Story, "You send the data core archive home.");
            if let Some(clue) = &c.clue {
                record(s, clue, &e);
            }
        }

        EntityState::ServiceBot(b) => {
            b.activated = true;
            msg!(
                s.logs,
                LogKind::Info,
                "The service bot whirs awake and starts scrubbing."
            );
        }

        EntityState::LogTerminal(t) => {
            t.read = true;
            match &t.clue {
                Some(clue) => record(s, clue, &e),
                None => msg!(s.logs, LogKind::Info, "The terminal is blank."),
            }
        }

        EntityState::CrewItem(i) => {
            i.examined = true;
            match &i.clue {
                Some(clue) => record(s, clue, &e),
                None => {
                    msg!(s.logs, LogKind::Info, "Nothing useful on the {name}.")
                }
            }
        }

        EntityState::Drone(d) => {
            d.activated = true;
            let revealed = match s.room_at(e.pos).cloned() {
                Some(room) => {
                    let ids: Vec<EntityId> = s
                        .entities
                        .iter()
                        .filter(|o| o.id != id && room.contains(o.pos))
                        .map(|o| o.id)
                        .collect();
                    let mut n = 0;
                    for o in ids {
                        if s.entities.reveal(o)? {
                            n += 1;
                        }
                    }
                    n
                }
                None => 0,
            };
            msg!(
                s.logs,
                LogKind::Info,
                "The drone sweeps the room and marks {revealed} contacts."
            );
        }

        EntityState::MedKit(k) => {
            if s.player.hp() >= s.player.max_hp() {
                return illegal("Your chassis is already in full repair.");
            }
            s.player.vitals.heal(k.heal);
            consumed = true;
            msg!(s.logs, LogKind::Info, "You patch yourself up.");
        }

        EntityState::RepairBot(b) => {
            b.activated = true;
            msg!(
                s.logs,
                LogKind::Info,
                "The repair bot falls in behind you, sealant at the ready."
            );
        }

        EntityState::Breach(b) => {
            b.sealed = true;
            msg!(s.logs, LogKind::Info, "You seal the hull breach.");
        }

        EntityState::ClosedDoor(d) => {
            if d.locked {
                return illegal("The door is locked.");
            }
            d.open = true;
            msg!(s.logs, LogKind::Info, "The door slides open.");
        }

        EntityState::SecurityTerminal(t) => {
            t.activated = true;
            unlock_station(s, id)?;
            msg!(
                s.logs,
                LogKind::System,
                "Security override accepted. All locks released."
            );
        }

        EntityState::PatrolDrone(d) => {
            d.disabled = true;
            msg!(s.logs, LogKind::Info, "You pull the patrol drone's fuse.");
        }

        EntityState::PressureValve(v) => {
            v.opened = true;
            msg!(s.logs, LogKind::Info, "Air hisses back into the room.");
        }

        EntityState::FuseBox(f) => {
            if s.player.power_cells == 0 {
                return illegal("The fuse box needs a power cell.");
            }
            s.player.power_cells -= 1;
            f.powered = true;
            let n = unlock_relays_near(s, e.pos)?;
            msg!(
                s.logs,
                LogKind::Info,
                "The fuse box powers up, unlocking {n} relays."
            );
        }

        EntityState::PowerCell(_) => {
            s.player.power_cells += 1;
            consumed = true;
            msg!(s.logs, LogKind::Info, "You pick up a power cell.");
        }

        EntityState::EscapePod(pod) => {
            if phase != ObjectivePhase::Evacuate {
                return illegal("The escape pod's launch interlock is engaged.");
            }
            let boarding: Vec<EntityId> = s
                .entities
                .iter()
                .filter(|o| {
                    matches!(&o.state, EntityState::CrewNpc(c) if c.following && c.is_aboard())
                        && (o.pos - e.pos).king_len() <= 2
                })
                .map(|o| o.id)
                .take(pod.capacity.saturating_sub(pod.boarded.len()))
                .collect();
            if boarding.is_empty() {
                return illegal("There's no crew here to put in the pod.");
            }
            let ctl = ObjectivePhaseController::new(&config);
            for crew in boarding {
                ctl.evacuate(s, crew)?;
                pod.boarded.push(crew);
            }
            pod.launched = true;
            msg!(s.logs, LogKind::Story, "The escape pod launches.");
        }

        EntityState::CrewNpc(c) => {
            c.found = true;
            c.following = true;
            s.stats.crew_found += 1;
            msg!(s.logs, LogKind::Story, "{name} is alive and follows you.");
        }

        EntityState::Airlock(a) => {
            if phase != ObjectivePhase::Evacuate {
                return illegal("The airlock is sealed until evacuation begins.");
            }
            a.cycled = true;
            msg!(
                s.logs,
                LogKind::Info,
                "The airlock cycles open. Bring the crew through."
            );
        }

        EntityState::ToolPickup(ToolPickup { attachment })
        | EntityState::UtilityPickup(UtilityPickup { attachment }) => {
            let attachment = *attachment;
            consumed = true;
            if let Some(old) = s.player.attach(attachment) {
                let dropped = match old.slot() {
                    AttachmentSlot::Tool => {
                        EntityState::ToolPickup(ToolPickup { attachment: old })
                    }
                    AttachmentSlot::Utility => {
                        EntityState::UtilityPickup(UtilityPickup { attachment: old })
                    }
                };
                s.entities.spawn(e.pos, dropped);
            }
            msg!(s.logs, LogKind::Info, "You fit the {attachment}.");
        }

        EntityState::Console(c) => {
            c.accessed = true;
            msg!(s.logs, LogKind::System, "Console: {}", phase.objective());
            if let Some(clue) = &c.clue {
                record(s, clue, &e);
            }
        }

        EntityState::RepairCradle(r) => {
            if s.player.hp() >= s.player.max_hp() && !s.player.is_stunned() {
                return illegal("No repairs needed.");
            }
            let max = s.player.max_hp();
            s.player.vitals.heal(max);
            s.player.stun_turns = 0;
            r.charges = r.charges.saturating_sub(1);
            msg!(s.logs, LogKind::Info, "The cradle restores you to full repair.");
        }

        EntityState::EvidenceTrace(t) => {
            t.examined = true;
            if let Some(clue) = &t.clue {
                record(s, clue, &e);
            }
        }
    }

    if consumed {
        s.entities.remove(id)?;
    } else {
        s.entities.mutate(id, |st| *st = state)?;
    }
    Ok(())
}

/// Add a clue to the journal and announce any deduction it unlocks.
pub(crate) fn record(s: &mut GameState, clue: &Clue, source: &Entity) {
    let before = s.open_deductions();
    let evidence = Evidence {
        id: clue.id.clone(),
        text: clue.text.clone(),
        room_id: s.room_at(source.pos).map(|r| r.id),
        entity_id: Some(source.id),
    };
    if !DeductionEngine::record(&mut s.mystery, evidence) {
        return;
    }
    msg!(s.logs, LogKind::Evidence, "{}", clue.text);

    let unlocked: Vec<String> = DeductionEngine::unlocked(&s.mystery)
        .filter(|d| !before.contains(&d.id))
        .map(|d| d.question.clone())
        .collect();
    for question in unlocked {
        msg!(s.logs, LogKind::Evidence, "New deduction: {question}");
    }
}

fn relay_count(s: &GameState) -> (usize, usize) {
    let relays: Vec<bool> = s
        .entities
        .iter()
        .filter_map(|e| match &e.state {
            EntityState::Relay(r) => Some(r.activated),
            _ => None,
        })
        .collect();
    (relays.iter().filter(|&&a| a).count(), relays.len())
}

/// Unlock relays, doors and locked door tiles everywhere.
fn unlock_station(s: &mut GameState, terminal: EntityId) -> Result<()> {
    for id in s.entities.ids() {
        if id == terminal {
            continue;
        }
        s.entities.mutate(id, |st| match st {
            EntityState::Relay(r) => r.locked = false,
            EntityState::ClosedDoor(d) => d.locked = false,
            _ => {}
        })?;
    }
    let locked: Vec<IVec2> = s
        .tiles
        .iter()
        .filter(|(_, t)| t.kind() == TileType::LockedDoor)
        .map(|(p, _)| p)
        .collect();
    for p in locked {
        s.tiles.set_kind(p, TileType::Door)?;
    }
    Ok(())
}

/// Unlock relays in the same room as a position.
fn unlock_relays_near(s: &mut GameState, pos: IVec2) -> Result<usize> {
    let room = s.room_at(pos).map(|r| r.bounds());
    let ids: Vec<EntityId> = s
        .entities
        .iter()
        .filter(|e| {
            matches!(&e.state, EntityState::Relay(r) if r.locked)
                && room.map_or((e.pos - pos).king_len() <= 1, |r| r.contains(e.pos))
        })
        .map(|e| e.id)
        .collect();
    for &id in &ids {
        s.entities.mutate(id, |st| {
            if let EntityState::Relay(r) = st {
                r.locked = false;
            }
        })?;
    }
    Ok(ids.len())
}
