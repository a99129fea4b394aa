mod cli;
mod train;

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use bandpractice::app::AppState;
use bandpractice::audio::{AudioPlayer, SilentAudio, TerminalAudio};
use bandpractice::db;
use bandpractice::feedback::apply_session_feedback;
use bandpractice::model::{FocusArea, Instrument};
use bandpractice::output;
use bandpractice::progress;
use bandpractice::store::{self, SqliteStore};
use bandpractice::tui;
use cli::{Cli, Command, Drill};

fn default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".bandpractice").join("practice.db"))
}

fn resolve_db_path(cli_db: Option<String>) -> Result<String> {
    match cli_db {
        Some(p) => Ok(p),
        None => {
            let path = default_db_path()?;
            Ok(path
                .to_str()
                .context("default DB path is not valid UTF-8")?
                .to_string())
        }
    }
}

fn ensure_db_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn open_store(db_path: &str) -> Result<SqliteStore> {
    ensure_db_dir(db_path)?;
    let conn = db::open(db_path)?;
    SqliteStore::new(conn)
}

fn init_logging(log_file: Option<&str>, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_secs().parse_default_env();
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {path}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn audio(mute: bool) -> Box<dyn AudioPlayer> {
    if mute {
        Box::new(SilentAudio)
    } else {
        Box::new(TerminalAudio::new(io::stdout()))
    }
}

/// Apply instrument, duration and focus through the same checks the
/// interactive setup uses.
fn configure(app: &mut AppState, instrument: &str, minutes: u32, focus: &str) -> Result<()> {
    app.select_instrument(Instrument::parse(instrument)?);
    app.select_duration(minutes)?;
    app.select_focus(FocusArea::parse(focus)?)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), cli.verbose)?;

    if let Command::Instruments = cli.command {
        print!("{}", output::format_instruments());
        return Ok(());
    }
    if let Command::Train { drill, tier, mute } = cli.command {
        let mut audio = audio(mute);
        let mut rng = rand::rng();
        let stdin = io::stdin().lock();
        let mut stdout = io::stdout();
        match drill {
            Drill::Intervals => {
                let tally = train::intervals(stdin, &mut stdout, audio.as_mut(), &mut rng)?;
                println!("{} of {} correct", tally.correct, tally.answered);
            }
            Drill::Pitch => {
                let tally = train::pitch(stdin, &mut stdout, audio.as_mut(), &mut rng)?;
                println!("{} of {} correct", tally.correct, tally.answered);
            }
            Drill::Rhythm => {
                let shown = train::rhythm(stdin, &mut stdout, tier, &mut rng)?;
                println!("{shown} cards");
            }
        }
        return Ok(());
    }

    let db_path = resolve_db_path(cli.db)?;
    let mut storage = open_store(&db_path)?;
    let loaded = store::load_all(&mut storage)?;
    let mut app = AppState::new(loaded.scores, loaded.log, loaded.placement_completed);

    match cli.command {
        Command::Instruments | Command::Train { .. } => {}

        Command::Plan {
            instrument,
            minutes,
            focus,
            json,
        } => {
            configure(&mut app, &instrument, minutes, &focus)?;
            let session = bandpractice::session::plan_session(
                app.instrument().context("no instrument selected")?,
                app.focus(),
                app.duration(),
                &app.scores,
            );
            if session.is_empty() {
                eprintln!("Nothing to practice with these settings; cannot start");
                std::process::exit(1);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                print!("{}", output::format_session(&session));
            }
        }

        Command::Practice {
            instrument,
            minutes,
            focus,
            mute,
        } => {
            if !app.placement_completed {
                eprintln!("Tip: run 'bandpractice placement' to start from your current level");
            }
            configure(&mut app, &instrument, minutes, &focus)?;
            if !app.generate_session() {
                bail!("nothing to practice with these settings; cannot start");
            }
            let mut audio = audio(mute);
            match tui::run(&mut app, audio.as_mut(), today())? {
                Some(outcome) => {
                    store::save_progress(&mut storage, &app.scores, &app.log)?;
                    print!("{}", output::format_feedback(&outcome));
                }
                None => eprintln!("Session discarded"),
            }
        }

        Command::Feedback {
            instrument,
            elapsed,
            ratings,
        } => {
            let instrument = Instrument::parse(&instrument)?;
            for (area, _) in &ratings {
                if !instrument.allocates(*area) {
                    bail!("{instrument} does not practice '{area}'");
                }
            }
            let ratings: BTreeMap<_, _> = ratings.into_iter().collect();
            let outcome = apply_session_feedback(
                &mut app.scores,
                &mut app.log,
                &ratings,
                elapsed,
                instrument,
                today(),
            );
            store::save_progress(&mut storage, &app.scores, &app.log)?;
            print!("{}", output::format_feedback(&outcome));
        }

        Command::Placement {
            instrument,
            tiers,
            skip,
        } => {
            if skip {
                app.skip_placement();
                store::mark_placement_completed(&mut storage)?;
                eprintln!("Placement skipped");
            } else {
                let instrument = instrument.context("--instrument is required")?;
                let instrument = Instrument::parse(&instrument)?;
                for (area, _) in &tiers {
                    if !instrument.supported_areas().contains(area) {
                        bail!("{instrument} has no placement for '{area}'");
                    }
                }
                let tiers: BTreeMap<_, _> = tiers.into_iter().collect();
                app.complete_placement(instrument, &tiers);
                store::save_placement(&mut storage, &app.scores)?;
                print!("{}", output::format_scores(&app.scores));
            }
        }

        Command::Progress { json } => {
            let dashboard = progress::dashboard(&app.scores, &app.log, today());
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print!("{}", output::format_progress(&dashboard));
            }
        }

        Command::Scores { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&output::score_rows(&app.scores))?);
            } else {
                print!("{}", output::format_scores(&app.scores));
            }
        }
    }

    Ok(())
}
