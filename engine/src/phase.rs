use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{msg, prelude::*, EntityState, GameState, LogKind};

/// Campaign stage. Only ever moves forward.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectivePhase {
    #[default]
    Clean,
    Investigate,
    Recover,
    Evacuate,
}

impl ObjectivePhase {
    pub fn next(self) -> Option<Self> {
        use ObjectivePhase::*;
        match self {
            Clean => Some(Investigate),
            Investigate => Some(Recover),
            Recover => Some(Evacuate),
            Evacuate => None,
        }
    }

    /// Player facing description of the current goal.
    pub fn objective(self) -> &'static str {
        use ObjectivePhase::*;
        match self {
            Clean => "Clean up the maintenance area.",
            Investigate => "Restore power by rerouting the relays.",
            Recover => {
                "Work out what happened here, then transmit the data core."
            }
            Evacuate => "Get the surviving crew off the station.",
        }
    }
}

/// Progress counters the phase milestones are measured against.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct Milestones {
    pub tiles_cleaned: u32,
    pub relays_activated: usize,
    pub correct_deductions: usize,
}

impl Milestones {
    pub fn of(state: &GameState) -> Self {
        Milestones {
            tiles_cleaned: state.stats.tiles_cleaned,
            relays_activated: state
                .entities
                .iter()
                .filter(|e| matches!(&e.state, EntityState::Relay(r) if r.activated))
                .count(),
            correct_deductions: state.mystery.correct_deductions(),
        }
    }
}

/// Outcome of a finished game.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Advances the campaign phase and decides when the game ends.
pub struct ObjectivePhaseController<'a> {
    config: &'a Config,
}

impl<'a> ObjectivePhaseController<'a> {
    pub fn new(config: &'a Config) -> Self {
        ObjectivePhaseController { config }
    }

    /// Whether the milestone that ends the given phase has been reached.
    pub fn milestone_met(&self, phase: ObjectivePhase, m: &Milestones) -> bool {
        match phase {
            ObjectivePhase::Clean => m.tiles_cleaned >= self.config.clean_milestone,
            ObjectivePhase::Investigate => {
                m.relays_activated >= self.config.relay_milestone
            }
            ObjectivePhase::Recover => {
                m.correct_deductions >= self.config.deduction_milestone
            }
            ObjectivePhase::Evacuate => false,
        }
    }

    /// Move to the next phase if its milestone is met. At most one step per
    /// call.
    pub fn update(&self, state: &mut GameState) -> Option<ObjectivePhase> {
        let phase = state.mystery.objective_phase;
        if !self.milestone_met(phase, &Milestones::of(state)) {
            return None;
        }
        let next = phase.next()?;
        state.mystery.objective_phase = next;

        log::info!("phase {phase} -> {next} on turn {}", state.turn);
        msg!(state.logs, LogKind::System, "New objective: {}", next.objective());
        Some(next)
    }

    /// Decide whether the game has ended.
    pub fn outcome(&self, state: &GameState) -> Option<Outcome> {
        if !state.player.is_alive() {
            return Some(Outcome::Defeat);
        }

        let transmitted = state
            .entities
            .iter()
            .any(|e| matches!(&e.state, EntityState::DataCore(c) if c.transmitted));
        if transmitted
            || state.mystery.evacuation.crew_evacuated.len()
                >= self.config.evacuation_goal
        {
            return Some(Outcome::Victory);
        }

        if state.mystery.objective_phase == ObjectivePhase::Evacuate {
            let crew: Vec<EntityId> = state
                .entities
                .iter()
                .filter(|e| e.kind() == EntityKind::CrewNpc)
                .map(|e| e.id)
                .collect();
            if !crew.is_empty()
                && crew
                    .iter()
                    .all(|&id| state.mystery.evacuation.is_resolved(id))
            {
                return Some(Outcome::Defeat);
            }
        }

        None
    }

    /// Record a crew member as evacuated.
    pub fn evacuate(&self, state: &mut GameState, id: EntityId) -> Result<()> {
        let name = state.entities.get(id)?.name();
        state.entities.mutate(id, |s| match s {
            EntityState::CrewNpc(c) if c.is_aboard() => {
                c.evacuated = true;
                c.following = false;
                Ok(())
            }
            _ => broken(format!("{id} is not crew that can evacuate")),
        })??;
        state.mystery.evacuation.crew_evacuated.push(id);
        msg!(state.logs, LogKind::Info, "{name} is safely off the station.");
        Ok(())
    }

    /// Record a crew member as lost.
    pub fn bury(&self, state: &mut GameState, id: EntityId) -> Result<()> {
        state.entities.mutate(id, |s| match s {
            EntityState::CrewNpc(c) if !c.evacuated => {
                c.dead = true;
                c.following = false;
                c.vitals.hp = c.vitals.hp.min(0);
                Ok(())
            }
            _ => broken(format!("{id} is not crew that can die")),
        })??;
        if !state.mystery.evacuation.crew_dead.contains(&id) {
            state.mystery.evacuation.crew_dead.push(id);
        }
        Ok(())
    }

    /// Close out the game, any crew still aboard is lost.
    pub fn finish(&self, state: &mut GameState, outcome: Outcome) -> Result<()> {
        let aboard: Vec<EntityId> = state
            .entities
            .iter()
            .filter(|e| matches!(&e.state, EntityState::CrewNpc(c) if c.is_aboard()))
            .map(|e| e.id)
            .collect();
        for id in aboard {
            self.bury(state, id)?;
        }

        state.game_over = true;
        state.victory = outcome == Outcome::Victory;
        log::info!("game over on turn {}: {outcome:?}", state.turn);
        match outcome {
            Outcome::Victory => {
                msg!(state.logs, LogKind::Story, "Mission complete.")
            }
            Outcome::Defeat => msg!(state.logs, LogKind::Danger, "Mission failed."),
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn phases_go_forward() {
        let mut p = ObjectivePhase::Clean;
        let mut seen = vec![p];
        while let Some(next) = p.next() {
            assert!(next > p);
            p = next;
            seen.push(p);
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(p, ObjectivePhase::Evacuate);
    }

    #[test]
    fn milestones() {
        let config = Config::default();
        let ctl = ObjectivePhaseController::new(&config);
        let mut m = Milestones::default();
        assert!(!ctl.milestone_met(ObjectivePhase::Clean, &m));
        m.tiles_cleaned = config.clean_milestone;
        assert!(ctl.milestone_met(ObjectivePhase::Clean, &m));
        assert!(!ctl.milestone_met(ObjectivePhase::Investigate, &m));
        assert!(!ctl.milestone_met(ObjectivePhase::Evacuate, &m));
    }
}
