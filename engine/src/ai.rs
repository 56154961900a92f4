//! Entity reactions run once per turn after the player acts.

use util::astar_path;

use crate::{
    msg, prelude::*, Entity, EntityState, GameState, LogKind, ObjectivePhase,
    ObjectivePhaseController,
};

/// Let every entity react to the new situation.
pub(crate) fn react(s: &mut GameState) -> Result<()> {
    sensor_sweep(s)?;

    for id in s.entities.ids() {
        // Earlier reactions may have removed or changed the entity.
        let Ok(e) = s.entities.get(id) else { continue };
        let e = e.clone();

        match &e.state {
            EntityState::PatrolDrone(d) if !d.disabled => {
                patrol(s, &e, d.heading)?;
            }
            EntityState::CrewNpc(c) if c.is_aboard() => {
                if c.following {
                    follow(s, &e)?;
                }
                crew_hazards(s, id)?;
            }
            EntityState::RepairBot(b) if b.activated => {
                follow(s, &e)?;
                seal_breaches(s, id)?;
            }
            _ => {}
        }
    }

    airlocks(s)
}

/// Damage to the player from the tile they end the turn on.
pub(crate) fn player_hazards(s: &mut GameState) -> Result<()> {
    let config = s.config;
    let tile = s.tiles.get(s.player.pos)?;
    let (heat, pressure) = (tile.heat(), tile.pressure());

    let shielded = s.player.has_attachment(crate::Attachment::HeatShield);
    let damage = s.player.vitals.expose_to_heat(&config, heat, shielded);
    if damage > 0 {
        s.stats.damage_taken += damage;
        msg!(s.logs, LogKind::Danger, "The heat is cooking your circuits.");
    }

    if pressure < config.pressure_danger {
        s.player.vitals.hp -= 1;
        s.stats.damage_taken += 1;
        msg!(s.logs, LogKind::Danger, "Vacuum strains your seals.");
    }
    Ok(())
}

/// Active sensor picks up matching traces within range.
fn sensor_sweep(s: &mut GameState) -> Result<()> {
    let Some(sensor) = s.player.active_sensor else {
        return Ok(());
    };
    let range = s.config.sensor_range;
    let pos = s.player.pos;

    let found: Vec<EntityId> = s
        .entities
        .iter()
        .filter(|e| {
            !e.revealed
                && (e.pos - pos).king_len() <= range
                && matches!(&e.state, EntityState::EvidenceTrace(t) if t.sensor == sensor)
        })
        .map(|e| e.id)
        .collect();

    for id in found {
        s.entities.reveal(id)?;
        msg!(
            s.logs,
            LogKind::Evidence,
            "Your {sensor} sensor picks up a trace nearby."
        );
    }
    Ok(())
}

/// Step a follower toward the player.
fn follow(s: &mut GameState, e: &Entity) -> Result<()> {
    let goal = s.player.pos;
    if (e.pos - goal).king_len() <= 1 {
        return Ok(());
    }

    let (tiles, entities) = (&s.tiles, &s.entities);
    let path = astar_path(
        &e.pos,
        &goal,
        |&p| {
            DIR_4.map(|d| p + d).into_iter().filter(move |&q| {
                tiles.is_walkable(q)
                    && (q == goal || entities.blocker_at(q).is_none())
            })
        },
        |a, b| (*b - *a).taxi_len() as usize,
    );

    if let Some(&next) = path.as_ref().and_then(|p| p.get(1)) {
        if next != goal {
            s.entities.relocate(e.id, next)?;
        }
    }
    Ok(())
}

/// Move a patrol drone along its heading and zap the player if adjacent.
fn patrol(s: &mut GameState, e: &Entity, heading: IVec2) -> Result<()> {
    let next = e.pos + heading;
    let open = s.tiles.is_walkable(next)
        && next != s.player.pos
        && s.entities.blocker_at(next).is_none();

    let pos = if open {
        s.entities.relocate(e.id, next)?;
        next
    } else {
        s.entities.mutate(e.id, |st| {
            if let EntityState::PatrolDrone(d) = st {
                d.heading = -d.heading;
            }
        })?;
        e.pos
    };

    if (pos - s.player.pos).king_len() <= 1 && !s.player.is_stunned() {
        s.player.stun_turns = s.config.patrol_stun;
        log::debug!("player stunned by {}", e.id);
        msg!(
            s.logs,
            LogKind::Danger,
            "The patrol drone zaps you. Actuators locked for {} turns.",
            s.config.patrol_stun
        );
    }
    Ok(())
}

/// Heat and vacuum hurt crew the same way they hurt the player.
fn crew_hazards(s: &mut GameState, id: EntityId) -> Result<()> {
    let config = s.config;
    let e = s.entities.get(id)?;
    let tile = s.tiles.get(e.pos)?;
    let (heat, pressure) = (tile.heat(), tile.pressure());
    let name = e.name();

    let dead = s.entities.mutate(id, |st| match st {
        EntityState::CrewNpc(c) => {
            c.vitals.expose_to_heat(&config, heat, false);
            if pressure < config.pressure_danger {
                c.vitals.hp -= 1;
            }
            !c.vitals.is_alive()
        }
        _ => false,
    })?;

    if dead {
        ObjectivePhaseController::new(&config).bury(s, id)?;
        msg!(s.logs, LogKind::Danger, "{name} didn't make it.");
    }
    Ok(())
}

/// Active repair bots seal breaches next to them.
fn seal_breaches(s: &mut GameState, bot: EntityId) -> Result<()> {
    let pos = s.entities.get(bot)?.pos;
    let breaches: Vec<EntityId> = s
        .entities
        .iter()
        .filter(|e| {
            matches!(&e.state, EntityState::Breach(b) if !b.sealed)
                && (e.pos - pos).king_len() <= 1
        })
        .map(|e| e.id)
        .collect();

    for id in breaches {
        s.entities.mutate(id, |st| {
            if let EntityState::Breach(b) = st {
                b.sealed = true;
            }
        })?;
        msg!(s.logs, LogKind::Info, "The repair bot seals a hull breach.");
    }
    Ok(())
}

/// Following crew next to a cycled airlock leave the station.
fn airlocks(s: &mut GameState) -> Result<()> {
    if s.mystery.objective_phase != ObjectivePhase::Evacuate {
        return Ok(());
    }

    let locks: Vec<IVec2> = s
        .entities
        .iter()
        .filter(|e| matches!(&e.state, EntityState::Airlock(a) if a.cycled))
        .map(|e| e.pos)
        .collect();
    let leaving: Vec<EntityId> = s
        .entities
        .iter()
        .filter(|e| {
            matches!(&e.state, EntityState::CrewNpc(c) if c.following && c.is_aboard())
                && locks.iter().any(|&a| (e.pos - a).king_len() <= 1)
        })
        .map(|e| e.id)
        .collect();

    let config = s.config;
    let ctl = ObjectivePhaseController::new(&config);
    for id in leaving {
        ctl.evacuate(s, id)?;
    }
    Ok(())
}
