use std::io::Write;

use engine::{
    map_glyph, overlay_digit, prelude::*, Display, GameState, LogKind,
    SensorType, UiContext,
};

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Line-oriented display that prints the map and messages as plain text.
pub struct TextDisplay<W> {
    out: W,
    /// Use terminal escapes to dim remembered cells.
    ansi: bool,
    overlay: Option<SensorType>,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W, ansi: bool) -> Self {
        TextDisplay {
            out,
            ansi,
            overlay: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn map_row(&self, state: &GameState, y: i32) -> String {
        let mut line = String::new();
        let mut dim = false;
        for x in 0..state.width() {
            let p = ivec2(x, y);
            let Ok(tile) = state.tiles.get(p) else {
                continue;
            };

            let remembered = tile.is_explored() && !tile.is_visible();
            if self.ansi && remembered != dim {
                line.push_str(if remembered { DIM } else { RESET });
                dim = remembered;
            }

            let mut c = map_glyph(state, p);
            // Hazard readings only replace bare floor.
            if matches!(c, '.' | ',') {
                if let Some(d) =
                    self.overlay.and_then(|s| overlay_digit(state, s, p))
                {
                    c = d;
                }
            }
            line.push(c);
        }
        if dim {
            line.push_str(RESET);
        }
        line.trim_end().to_owned()
    }

    fn emit(&mut self, text: &str) {
        // Broken pipes end the session through the input side.
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> Display for TextDisplay<W> {
    fn render(&mut self, state: &GameState) {
        self.overlay = state.player.active_sensor;
        let rows: Vec<String> =
            (0..state.height()).map(|y| self.map_row(state, y)).collect();
        for row in rows {
            self.emit(&row);
        }
    }

    fn render_ui(&mut self, state: &GameState, ui: &UiContext) {
        let p = &state.player;
        let sensor = match p.active_sensor {
            Some(s) => s.to_string(),
            None => "off".into(),
        };
        let status = format!(
            "Turn {}  HP {}/{}  Sensor {}  Phase {}: {}",
            state.turn,
            p.hp(),
            p.max_hp(),
            sensor,
            ui.phase,
            ui.phase.objective()
        );
        self.emit(&status);
        if p.is_stunned() {
            self.emit("Your actuators are locked up.");
        }

        for d in &ui.open_deductions {
            self.emit(&format!("? [{}] {}", d.id, d.question));
            for o in &d.options {
                self.emit(&format!("    - {o}"));
            }
        }

        if state.game_over {
            self.emit(if state.victory {
                "*** Mission complete ***"
            } else {
                "*** Mission failed ***"
            });
        }
        let _ = self.out.flush();
    }

    fn add_log(&mut self, text: &str, kind: LogKind) {
        let prefix = match kind {
            LogKind::Info => "",
            LogKind::Warning => "! ",
            LogKind::Danger => "!! ",
            LogKind::Evidence => "+ ",
            LogKind::Story => "> ",
            LogKind::System => "* ",
        };
        self.emit(&format!("{prefix}{text}"));
    }

    fn active_overlay(&self) -> Option<SensorType> {
        self.overlay
    }

    fn destroy(&mut self) {
        let _ = self.out.flush();
    }
}
