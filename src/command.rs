use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use engine::{prelude::*, Intent, SensorType};

/// A line of player input.
#[derive(Clone, PartialEq, Debug)]
pub enum Command {
    /// Submit an intent to the simulation.
    Act(Intent),
    Save(PathBuf),
    /// Print the evidence journal.
    Journal,
    /// Redraw the current state.
    Look,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  n e s w, move <dx> <dy>    step one tile
  i, interact [#id]          use an adjacent thing
  c, clean                   clean your tile
  z, wait                    let a turn pass
  sensor <name>              toggle cleanliness, thermal, atmospheric or trace
  answer <deduction> <text>  answer an open deduction
  choose <choice>            make a decision
  journal                    list recorded evidence
  look                       redraw the map
  save <file>                save the game, .sz files are compressed
  quit";

impl From<Intent> for Command {
    fn from(value: Intent) -> Self {
        Command::Act(value)
    }
}

fn step(dir: usize) -> Command {
    Intent::Move(DIR_4[dir]).into()
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (head, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        Ok(match head.to_ascii_lowercase().as_str() {
            // DIR_4 goes north, east, south, west.
            "n" | "north" | "k" => step(0),
            "e" | "east" | "l" => step(1),
            "s" | "south" | "j" => step(2),
            "w" | "west" | "h" => step(3),
            "move" | "m" => {
                let [dx, dy] = args[..] else {
                    bail!("usage: move <dx> <dy>");
                };
                let d = ivec2(
                    dx.parse().context("bad dx")?,
                    dy.parse().context("bad dy")?,
                );
                Intent::Move(d).into()
            }
            "i" | "interact" => match args[..] {
                [] => Intent::Interact(None).into(),
                [id] => Intent::Interact(Some(
                    id.parse().context("bad entity id")?,
                ))
                .into(),
                _ => bail!("usage: interact [#id]"),
            },
            "c" | "clean" => Intent::Clean.into(),
            "z" | "wait" | "." => Intent::Wait.into(),
            "sensor" => {
                let [name] = args[..] else {
                    bail!("usage: sensor <name>");
                };
                let sensor: SensorType =
                    name.parse().with_context(|| format!("no sensor {name}"))?;
                Intent::ToggleSensor(sensor).into()
            }
            "answer" | "a" => {
                let Some((deduction, answer)) =
                    rest.split_once(char::is_whitespace)
                else {
                    bail!("usage: answer <deduction> <text>");
                };
                Intent::Answer {
                    deduction: deduction.to_owned(),
                    answer: answer.trim().to_owned(),
                }
                .into()
            }
            "choose" => {
                let [id] = args[..] else {
                    bail!("usage: choose <choice>");
                };
                Intent::Choose(id.to_owned()).into()
            }
            "save" => {
                if rest.is_empty() {
                    bail!("usage: save <file>");
                }
                Command::Save(rest.into())
            }
            "journal" | "j?" => Command::Journal,
            "look" | "" => Command::Look,
            "help" | "?" => Command::Help,
            "quit" | "q" => Command::Quit,
            _ => bail!("unknown command {head:?}, try help"),
        })
    }
}
