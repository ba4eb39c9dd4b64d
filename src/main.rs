//! who-dances-what command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use who_dances_what::logging;
use who_dances_what::planner::Planner;
use who_dances_what::render::{self, Palette};
use who_dances_what::roster::DancerId;
use who_dances_what::solver::SolverConfig;
use who_dances_what::store::Store;

/// Works out who dances what from a preferences database.
#[derive(Parser, Debug)]
#[command(name = "who-dances-what")]
#[command(version)]
struct Args {
    /// SQLite database with dancers, dances and preferences
    #[arg(long, env = "WHO_DANCES_WHAT_DB", global = true)]
    db: Option<PathBuf>,

    /// Log filter, e.g. `info` or `who_dances_what=debug`; RUST_LOG wins
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Solver settings (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every dance with who is willing to take each position
    ListDances {
        /// Disable colour output
        #[arg(short = 'n', long = "no-colour", visible_alias = "no-color")]
        no_colour: bool,
    },
    /// List all active dancers
    ListActiveDancers,
    /// Generate a dance set for the named dancers
    DanceSet {
        /// Disable colour output
        #[arg(short = 'n', long = "no-colour", visible_alias = "no-color")]
        no_colour: bool,

        /// Dancers who are present
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let db = args
        .db
        .as_deref()
        .context("no database given; pass --db or set WHO_DANCES_WHAT_DB")?;
    let store = Store::open(db).with_context(|| format!("failed to open {}", db.display()))?;
    debug!(db = %db.display(), "database opened");

    match args.command {
        Command::ListDances { no_colour } => {
            let dancers = store.fetch_dancers().context("failed to load dancers")?;
            let dances = store.fetch_dances().context("failed to load dances")?;
            let edges = store
                .fetch_preferences(None)
                .context("failed to load preferences")?;
            print!(
                "{}",
                render::render_dance_list(&dances, &dancers, &edges, Palette::new(!no_colour))
            );
        }
        Command::ListActiveDancers => {
            let dancers = store.fetch_dancers().context("failed to load dancers")?;
            print!("{}", render::render_active_dancers(&dancers));
        }
        Command::DanceSet { no_colour, names } => {
            let config = match &args.config {
                Some(path) => SolverConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => SolverConfig::default(),
            };
            let dancers = store
                .fetch_dancers_by_name(&names)
                .context("failed to load dancers")?;
            let ids: Vec<DancerId> = dancers.iter().map(|d| d.id).collect();
            let dances = store.fetch_dances().context("failed to load dances")?;
            let edges = store
                .fetch_preferences(Some(&ids))
                .context("failed to load preferences")?;

            let result = Planner::new()
                .with_config(config)
                .solve(&dancers, &dances, &edges)
                .context("failed to plan dance set")?;
            info!(
                status = %result.status(),
                performed = result.performed_count(),
                "dance set ready"
            );
            print!("{}", render::render_dance_set(&result, Palette::new(!no_colour)));
        }
    }
    Ok(())
}
