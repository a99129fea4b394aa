use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use bandpractice::model::SkillArea;
use bandpractice::skill::{Rating, Tier};

#[derive(Parser)]
#[command(name = "bandpractice", about = "Adaptive practice planner for band instruments")]
pub struct Cli {
    /// Path to the SQLite database [default: ~/.bandpractice/practice.db]
    #[arg(long, env = "BANDPRACTICE_DB", global = true)]
    pub db: Option<String>,

    /// Append log records to this file instead of stderr
    #[arg(long, env = "BANDPRACTICE_LOG", global = true)]
    pub log_file: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List instruments by family with their focus options
    Instruments,

    /// Build a practice session and print it
    Plan {
        /// Instrument id (e.g. trumpet, snare, bassDrum)
        #[arg(short, long)]
        instrument: String,
        /// Session length in minutes
        #[arg(short, long, default_value_t = 30)]
        minutes: u32,
        /// Focus: balanced, repertoire, or a skill area id
        #[arg(short, long, default_value = "balanced")]
        focus: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a session interactively, then rate it
    Practice {
        /// Instrument id
        #[arg(short, long)]
        instrument: String,
        /// Session length in minutes
        #[arg(short, long, default_value_t = 30)]
        minutes: u32,
        /// Focus: balanced, repertoire, or a skill area id
        #[arg(short, long, default_value = "balanced")]
        focus: String,
        /// Do not ring the terminal bell
        #[arg(long)]
        mute: bool,
    },

    /// Record a session's ratings without the interactive runner
    Feedback {
        /// Instrument practiced
        #[arg(short, long)]
        instrument: String,
        /// Seconds actually practiced
        #[arg(long)]
        elapsed: u64,
        /// Ratings as area=rating (hard, justRight, easy)
        #[arg(value_parser = parse_rating, required = true)]
        ratings: Vec<(SkillArea, Rating)>,
    },

    /// Seed starting scores from self-assessed tiers
    Placement {
        /// Instrument to assess
        #[arg(short, long, required_unless_present = "skip")]
        instrument: Option<String>,
        /// Tiers as area=tier (1-5); unlisted areas start at tier 1
        #[arg(value_parser = parse_tier)]
        tiers: Vec<(SkillArea, Tier)>,
        /// Skip placement and keep current scores
        #[arg(long, conflicts_with_all = ["instrument", "tiers"])]
        skip: bool,
    },

    /// Show streak, hours, calendar and skill progress
    Progress {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show raw skill scores and tiers
    Scores {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ear training drills on stdin/stdout
    Train {
        #[arg(value_enum)]
        drill: Drill,
        /// Rhythm tier (1-3)
        #[arg(long, default_value_t = 1)]
        tier: u8,
        /// Do not ring the terminal bell
        #[arg(long)]
        mute: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Drill {
    Intervals,
    Pitch,
    Rhythm,
}

fn split_pair(s: &str) -> anyhow::Result<(&str, &str)> {
    s.split_once('=')
        .with_context(|| format!("expected key=value, got '{s}'"))
}

fn parse_rating(s: &str) -> anyhow::Result<(SkillArea, Rating)> {
    let (area, rating) = split_pair(s)?;
    Ok((SkillArea::parse(area)?, Rating::parse(rating)?))
}

fn parse_tier(s: &str) -> anyhow::Result<(SkillArea, Tier)> {
    let (area, tier) = split_pair(s)?;
    let n: u8 = tier
        .parse()
        .with_context(|| format!("invalid tier '{tier}'"))?;
    Ok((SkillArea::parse(area)?, Tier::from_number(n)?))
}
