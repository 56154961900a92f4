use std::sync::Arc;

use crate::{
    action, ai, mapgen, msg, prelude::*, GameState, HazardPropagator, Intent,
    LogKind, ObjectivePhaseController, VisibilityEngine, WorldSpec,
};

/// Where the scheduler is in its turn cycle.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub enum SchedulerState {
    #[default]
    AwaitingInput,
    Resolving,
    SnapshotReady,
}

/// Owns the authoritative game state and advances it one turn per
/// accepted intent.
///
/// Snapshots are shared immutable values. Advancing a turn while an old
/// snapshot is still held copies the state first, so held snapshots never
/// change under their owner.
pub struct TurnScheduler {
    state: Arc<GameState>,
    status: SchedulerState,
}

impl TurnScheduler {
    /// Take over a state and compute its initial view.
    pub fn new(mut state: GameState) -> Result<Self> {
        state.config.validate()?;
        state.check()?;
        let config = state.config;
        let radius = state.sight_radius();
        VisibilityEngine::new(&config).update(
            &mut state.tiles,
            &state.entities,
            state.player.pos,
            radius,
        )?;
        Ok(TurnScheduler {
            state: Arc::new(state),
            status: SchedulerState::SnapshotReady,
        })
    }

    /// Start a new game on a generated station.
    pub fn generate(spec: &WorldSpec, config: Config) -> Result<Self> {
        TurnScheduler::new(mapgen::generate(spec, config)?)
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<GameState> {
        self.state.clone()
    }

    pub fn status(&self) -> SchedulerState {
        self.status
    }

    /// Resolve one player intent.
    ///
    /// Rejected intents leave the turn counter where it was and add a log
    /// entry explaining the rejection, the returned error carries the
    /// reason. A turn that fails any other way leaves the state untouched.
    pub fn advance_turn(&mut self, intent: Intent) -> Result<Arc<GameState>> {
        if self.state.game_over {
            return Err(Error::GameOver);
        }

        self.status = SchedulerState::Resolving;
        let mut next = GameState::clone(&self.state);
        let ret = resolve(&mut next, &intent);
        self.status = SchedulerState::SnapshotReady;

        match ret {
            Ok(()) => {
                log::debug!("turn {} resolved {intent}", next.turn);
                self.state = Arc::new(next);
                Ok(self.state())
            }
            Err(e) if e.is_rejection() => {
                log::warn!("intent {intent} rejected: {e}");
                Arc::make_mut(&mut self.state).logs = next.logs;
                Err(e)
            }
            Err(e) => {
                log::error!("turn {} failed on {intent}: {e}", self.state.turn);
                Err(e)
            }
        }
    }
}

/// Advance a state by one intent.
///
/// On rejection only the log changes. Non-rejection errors mean the state
/// was found broken mid-turn and `s` may be half advanced.
pub fn resolve(s: &mut GameState, intent: &Intent) -> Result<()> {
    if s.game_over {
        return Err(Error::GameOver);
    }
    s.logs.set_turn(s.turn);
    let config = s.config;
    let seen_logs = s.logs.len();

    if s.player.is_stunned() && intent.is_physical() {
        msg!(s.logs, LogKind::Warning, "Your actuators are locked up.");
    } else if let Err(e) = action::apply(s, intent) {
        if e.is_rejection() {
            msg!(s.logs, LogKind::Warning, "{e}");
        }
        return Err(e);
    }
    s.logs.mark_read_before(seen_logs);

    s.player.stun_turns = s.player.stun_turns.saturating_sub(1);

    HazardPropagator::new(&config).step(
        &mut s.tiles,
        &s.rooms,
        &s.entities,
        s.turn,
    )?;
    ai::player_hazards(s)?;

    let radius = s.sight_radius();
    VisibilityEngine::new(&config).update(
        &mut s.tiles,
        &s.entities,
        s.player.pos,
        radius,
    )?;

    ai::react(s)?;

    let phases = ObjectivePhaseController::new(&config);
    phases.update(s);

    s.turn += 1;

    if let Some(outcome) = phases.outcome(s) {
        phases.finish(s, outcome)?;
    }
    Ok(())
}
