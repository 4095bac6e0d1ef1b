// Team builder entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing (stderr)
// 3. Load config
// 4. Open database
// 5. Seed the player pool from the roster CSV if the store is empty
// 6. Ensure the configured number of teams exists
// 7. Run the subcommand against the store

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use team_builder::cli::{self, Cli, Command};
use team_builder::config;
use team_builder::db::Database;
use team_builder::roster::import;

fn main() -> anyhow::Result<()> {
    // 1. Parse the command line
    let command = Cli::parse().command();

    // 2. Initialize tracing
    init_tracing()?;
    info!("Team builder starting up");

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams of {}, {:?} scale",
        config.league.name,
        config.league.num_teams,
        config.league.team_capacity,
        config.league.rating_scale
    );

    // 4. Open database
    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 5. Seed players (an explicit import brings its own roster)
    if db.player_count()? == 0 && !matches!(command, Command::Import { .. }) {
        let path = Path::new(&config.data_paths.roster);
        let entries = import::load_roster(path).context("failed to load default roster")?;
        let players = import::players_from_roster(&entries);
        db.sync_players(&players)
            .context("failed to store default roster")?;
        info!("Seeded {} players from {}", players.len(), path.display());
    }

    // 6. Teams
    if db.ensure_teams(config.league.num_teams)? {
        info!("Created {} empty teams", config.league.num_teams);
    }
    let stored = db.load_teams().context("failed to load teams")?.len();
    if stored != config.league.num_teams {
        warn!(
            "store holds {} teams but config asks for {}; using the stored teams",
            stored, config.league.num_teams
        );
    }

    // 7. Run
    cli::run(&command, &config, &db, &mut std::io::stdout().lock())?;

    info!("Team builder finished");
    Ok(())
}

/// Initialize tracing to stderr so stdout carries only command output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("team_builder=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
