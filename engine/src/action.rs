//! Direct effects of player intents.

use crate::{
    interact, msg, prelude::*, Attachment, DeductionEngine, GameState,
    HazardPropagator, Intent, LogKind,
};

/// Apply the player's part of a turn.
///
/// Fails without changing anything if the intent can't be carried out.
pub(crate) fn apply(s: &mut GameState, intent: &Intent) -> Result<()> {
    match intent {
        Intent::Move(dir) => step(s, *dir),
        Intent::Interact(target) => {
            let id = interact::target(s, *target)?;
            interact::interact(s, id)
        }
        Intent::Wait => Ok(()),
        Intent::ToggleSensor(sensor) => {
            if !s.player.has_sensor(*sensor) {
                return illegal(format!("You don't have a {sensor} sensor."));
            }
            if s.player.active_sensor == Some(*sensor) {
                s.player.active_sensor = None;
                msg!(s.logs, LogKind::System, "{sensor} sensor off.");
            } else {
                s.player.active_sensor = Some(*sensor);
                msg!(s.logs, LogKind::System, "{sensor} sensor on.");
            }
            Ok(())
        }
        Intent::Clean => clean(s),
        Intent::Answer { deduction, answer } => {
            let correct =
                DeductionEngine::answer(&mut s.mystery, deduction, answer)?;
            if correct {
                msg!(s.logs, LogKind::Evidence, "That fits the evidence.");
            } else {
                msg!(
                    s.logs,
                    LogKind::Evidence,
                    "That doesn't fit. The thought is lost."
                );
            }
            Ok(())
        }
        Intent::Choose(id) => {
            DeductionEngine::choose(&mut s.mystery, id)?;
            let prompt = s
                .mystery
                .choices
                .iter()
                .find(|c| &c.id == id)
                .map(|c| c.prompt.clone())
                .unwrap_or_default();
            msg!(s.logs, LogKind::Story, "Decided: {prompt}");
            Ok(())
        }
    }
}

fn step(s: &mut GameState, dir: IVec2) -> Result<()> {
    if dir.taxi_len() != 1 {
        return illegal("You can only move one step along a cardinal direction.");
    }
    let dest = s.player.pos + dir;
    let tile = s.tiles.get(dest)?;
    if !tile.is_walkable() {
        return match tile.kind() {
            TileType::LockedDoor => illegal("The door is locked."),
            _ => illegal("There's a wall in the way."),
        };
    }

    if let Some(blocker) = s.entities.blocker_at(dest) {
        if !blocker.state.is_following() {
            return illegal(format!("The {} is in the way.", blocker.name()));
        }
        // Followers swap places with the player.
        let id = blocker.id;
        s.entities.relocate(id, s.player.pos)?;
    }
    s.player.pos = dest;

    let pickups: Vec<EntityId> = s
        .entities
        .at(dest)
        .filter(|e| e.state.is_pickup())
        .map(|e| e.id)
        .collect();
    for id in pickups {
        match interact::interact(s, id) {
            Err(e) if e.is_rejection() => {}
            ret => ret?,
        }
    }
    Ok(())
}

fn clean(s: &mut GameState) -> Result<()> {
    let pos = s.player.pos;
    let area: Vec<IVec2> = if s.player.has_attachment(Attachment::Scrubber) {
        std::iter::once(pos).chain(DIR_8.map(|d| pos + d)).collect()
    } else {
        vec![pos]
    };
    let vent = s.player.has_attachment(Attachment::Extinguisher);

    let config = s.config;
    let hazards = HazardPropagator::new(&config);
    if !hazards.has_work(&s.tiles, area.iter().copied(), vent) {
        return illegal("There's nothing to clean here.");
    }
    let n = hazards.clean(&mut s.tiles, area, vent)?;
    s.stats.tiles_cleaned += n;
    if n > 0 {
        msg!(s.logs, LogKind::Info, "You scrub {n} tiles clean.");
    } else {
        msg!(s.logs, LogKind::Info, "You vent the heat away.");
    }
    Ok(())
}
