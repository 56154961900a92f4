//! Player facing message log.

use derive_more::Deref;
use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LogKind {
    #[default]
    Info,
    /// Rejected actions and mild trouble.
    Warning,
    /// The player or crew is getting hurt.
    Danger,
    Evidence,
    Story,
    System,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u32,
    pub turn: u64,
    pub text: String,
    pub kind: LogKind,
    pub read: bool,
}

/// Append-only message log.
#[derive(Clone, Default, Eq, PartialEq, Debug, Deref, Serialize, Deserialize)]
#[serde(default)]
pub struct Logs {
    #[deref]
    entries: Vec<LogEntry>,
    /// Turn stamped on new entries.
    turn: u64,
}

impl Logs {
    pub fn push(&mut self, kind: LogKind, text: impl Into<String>) {
        let text = text.into();
        log::debug!("[{kind}] {text}");
        self.entries.push(LogEntry {
            id: self.entries.len() as u32,
            turn: self.turn,
            text,
            kind,
            read: false,
        });
    }

    pub(crate) fn set_turn(&mut self, turn: u64) {
        self.turn = turn;
    }

    /// Mark everything before entry index `end` as read.
    pub(crate) fn mark_read_before(&mut self, end: usize) {
        for e in self.entries.iter_mut().take(end) {
            e.read = true;
        }
    }

    pub fn unread(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| !e.read)
    }

    /// Entries added at or after index `start`.
    pub fn since(&self, start: usize) -> &[LogEntry] {
        &self.entries[start.min(self.entries.len())..]
    }
}

/// Append a formatted entry to a log.
///
/// ```ignore
/// msg!(state.logs, LogKind::Info, "The {} hums.", name);
/// ```
#[macro_export]
macro_rules! msg {
    ($logs:expr, $kind:expr, $fmt:expr) => {
        $logs.push($kind, format!($fmt))
    };

    ($logs:expr, $kind:expr, $fmt:expr, $($arg:expr),* $(,)?) => {
        $logs.push($kind, format!($fmt, $($arg),*))
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_marking() {
        let mut logs = Logs::default();
        let name = "relay";
        msg!(logs, LogKind::Info, "one {name}");
        msg!(logs, LogKind::Warning, "two {}", 2);
        assert_eq!(logs.unread().count(), 2);
        assert_eq!(logs[0].text, "one relay");

        logs.mark_read_before(1);
        assert_eq!(logs.unread().count(), 1);
        assert_eq!(logs.since(1)[0].text, "two 2");
        assert_eq!(logs.since(9).len(), 0);
    }

    #[test]
    fn entries_carry_turn() {
        let mut logs = Logs::default();
        logs.set_turn(4);
        logs.push(LogKind::Story, "hello");
        assert_eq!(logs[0].turn, 4);
        assert_eq!(logs[0].id, 0);
    }
}
