use std::{
    fs,
    io::{self, BufRead, IsTerminal},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use engine::{
    present, save, Archetype, Config, Display, Error, GameState, Replay,
    TurnScheduler, WorldSpec,
};
use util::Logos;

mod command;
use command::Command;

mod text_display;
use text_display::TextDisplay;

pub const GAME_NAME: &str = "derelict";

#[derive(Parser, Debug)]
#[command(name = GAME_NAME, about = "Salvage a derelict station, one turn at a time")]
struct Args {
    #[arg(long, value_parser = |e: &str| Ok::<Logos, &str>(Logos::new(e)), help = "Station seed")]
    seed: Option<Logos>,

    #[arg(long, default_value_t = 48, help = "Station width")]
    width: i32,

    #[arg(long, default_value_t = 32, help = "Station height")]
    height: i32,

    #[arg(long, default_value_t = Archetype::Janitor, help = "Player loadout")]
    archetype: Archetype,

    #[arg(long, help = "IDM file with simulation settings")]
    config: Option<PathBuf>,

    #[arg(long, help = "Continue a saved game")]
    load: Option<PathBuf>,

    #[arg(long, help = "Start from the end of a recorded replay")]
    replay: Option<PathBuf>,

    #[arg(long, help = "Read commands from a file instead of standard input")]
    script: Option<PathBuf>,

    #[arg(long, help = "Write a replay of the session on exit")]
    record: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp(None)
    .try_init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    let (mut sched, mut replay) = start(&args, config)?;

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(io::BufReader::new(
            fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let ansi = stdout.is_terminal();
    let mut display = TextDisplay::new(stdout.lock(), ansi);

    let ret = run(&mut sched, replay.as_mut(), &mut display, input);
    display.destroy();

    if let (Some(path), Some(replay)) = (&args.record, &replay) {
        replay
            .save(path)
            .with_context(|| format!("writing replay {}", path.display()))?;
        log::info!("replay written to {}", path.display());
    }
    ret
}

/// Set up the game, also return a replay recorder if the game can be
/// replayed from a seed.
fn start(
    args: &Args,
    config: Config,
) -> anyhow::Result<(TurnScheduler, Option<Replay>)> {
    if let Some(path) = &args.load {
        let state = save::load(path)
            .with_context(|| format!("loading save {}", path.display()))?;
        // Saves don't remember how the station was made.
        return Ok((TurnScheduler::new(state)?, None));
    }

    if let Some(path) = &args.replay {
        let replay = Replay::load(path)
            .with_context(|| format!("loading replay {}", path.display()))?;
        log::info!("replaying {} turns of seed {}", replay.intents.len(), replay.spec.seed);
        let sched = replay.scheduler()?;
        return Ok((sched, Some(replay)));
    }

    let seed = args
        .seed
        .clone()
        .unwrap_or_else(|| Logos::sample(&mut rand::thread_rng(), 10));
    log::info!("seed: {seed}");

    let spec = WorldSpec {
        seed,
        width: args.width,
        height: args.height,
        archetype: args.archetype,
    };
    let sched = TurnScheduler::generate(&spec, config)?;
    Ok((sched, Some(Replay::new(spec, config))))
}

fn run(
    sched: &mut TurnScheduler,
    mut replay: Option<&mut Replay>,
    display: &mut impl Display,
    input: impl BufRead,
) -> anyhow::Result<()> {
    let mut cursor = present(display, &sched.state(), sched.status(), 0);

    for line in input.lines() {
        let line = line?;
        let cmd: Command = match line.parse() {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match cmd {
            Command::Act(intent) => {
                match sched.advance_turn(intent.clone()) {
                    Ok(_) => {}
                    Err(Error::GameOver) => break,
                    Err(e) if e.is_rejection() => {}
                    Err(e) => return Err(e.into()),
                }
                if let Some(r) = replay.as_deref_mut() {
                    r.push(intent);
                }
                cursor =
                    present(display, &sched.state(), sched.status(), cursor);
                if sched.state().game_over {
                    break;
                }
            }
            Command::Save(path) => match save::save(&sched.state(), &path) {
                Ok(()) => println!("Saved to {}.", path.display()),
                Err(e) => eprintln!("save failed: {e}"),
            },
            Command::Journal => journal(&sched.state()),
            Command::Look => {
                let state = sched.state();
                cursor = present(display, &state, sched.status(), cursor);
            }
            Command::Help => println!("{}", command::HELP),
            Command::Quit => break,
        }
    }
    Ok(())
}

fn journal(state: &GameState) {
    if state.mystery.journal.is_empty() {
        println!("No evidence recorded yet.");
    }
    for e in state.mystery.journal.iter() {
        println!("[{}] {}", e.id, e.text);
    }
}
