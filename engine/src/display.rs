//! Callback surface for presentation layers.

use crate::{
    prelude::*, Deduction, DeductionEngine, GameState, LogKind, ObjectivePhase,
    SchedulerState, SensorType,
};

/// Per-frame facts for the user interface that aren't simple state fields.
#[derive(Clone, Default, Debug)]
pub struct UiContext<'a> {
    pub status: SchedulerState,
    pub phase: ObjectivePhase,
    /// Deductions that can be answered right now.
    pub open_deductions: Vec<&'a Deduction>,
    /// Unread log entries.
    pub unread: usize,
}

impl<'a> UiContext<'a> {
    pub fn new(state: &'a GameState, status: SchedulerState) -> Self {
        UiContext {
            status,
            phase: state.mystery.objective_phase,
            open_deductions: DeductionEngine::unlocked(&state.mystery).collect(),
            unread: state.logs.unread().count(),
        }
    }
}

/// Presentation layer driven by the simulation.
///
/// Implementations only ever see shared references to the state and must
/// not try to feed anything back except through new intents.
pub trait Display {
    fn render(&mut self, state: &GameState);

    fn render_ui(&mut self, state: &GameState, ui: &UiContext);

    fn add_log(&mut self, text: &str, kind: LogKind);

    /// Sensor overlay the display is currently showing.
    fn active_overlay(&self) -> Option<SensorType> {
        None
    }

    fn destroy(&mut self) {}
}

/// Feed a snapshot to a display.
///
/// Log entries from index `log_cursor` on are passed to the display, the
/// return value is the cursor to use for the next call.
pub fn present(
    display: &mut impl Display,
    state: &GameState,
    status: SchedulerState,
    log_cursor: usize,
) -> usize {
    for e in state.logs.since(log_cursor) {
        display.add_log(&e.text, e.kind);
    }
    display.render(state);
    display.render_ui(state, &UiContext::new(state, status));
    state.logs.len()
}

/// What the player knows is at a map cell, as a single character.
///
/// Unexplored cells are blank. Remembered cells show the tile only,
/// entities are drawn only while perceived.
pub fn map_glyph(state: &GameState, p: IVec2) -> char {
    let Ok(tile) = state.tiles.get(p) else {
        return ' ';
    };
    if !tile.is_explored() {
        return ' ';
    }
    if p == state.player.pos {
        return '@';
    }
    if tile.is_visible() {
        if let Some(e) = state
            .entities
            .at(p)
            .filter(|e| state.is_perceived(e))
            // Prefer things that are still interesting.
            .min_by_key(|e| e.is_exhausted())
        {
            return e.kind().glyph();
        }
    }
    char::from(tile.kind())
}

/// Overlay intensity digit `0`..=`9` for a sensor at a cell.
///
/// Sensors without a hazard overlay and cells with nothing to report
/// give `None`.
pub fn overlay_digit(
    state: &GameState,
    sensor: SensorType,
    p: IVec2,
) -> Option<char> {
    let field = sensor.overlay()?;
    let tile = state.tiles.get(p).ok()?;
    if !tile.is_explored() || !tile.is_walkable() {
        return None;
    }
    let mut v = tile.reading().get(field) / field.max();
    if field == HazardField::Pressure {
        // Low pressure is the hazard.
        v = 1.0 - v;
    }
    if v <= 0.0 {
        return None;
    }
    let n = ((v * 10.0).ceil() as u32).clamp(1, 9);
    char::from_digit(n, 10)
}
