// Command-line interface. Every subcommand loads players and teams from the
// store, applies one edit or a balance run, and writes the result back.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::balance::{self, BalanceOptions, TeamSummary};
use crate::config::Config;
use crate::db::Database;
use crate::roster::import;
use crate::roster::team::{self, unassigned_players};
use crate::roster::{Player, Rating, Team};

#[derive(Debug, Parser)]
#[command(name = "team-builder")]
#[command(about = "Build evenly matched league teams from rated players")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The requested subcommand. A bare invocation balances.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Balance { json: false })
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Redistribute every unlocked and unassigned player, then save
    Balance {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stored teams without changing them
    Show {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a player onto a team, or back to the pool when no team is given
    Move {
        player: String,
        #[arg(short, long)]
        team: Option<String>,
    },

    /// Lock a player to their team, or unlock them if already locked
    Lock { team: String, player: String },

    /// Empty every team and drop every lock
    Clear,

    /// Replace the player pool with a `name,rating` CSV and empty the teams
    Import { csv: PathBuf },

    /// Add a player to the pool
    Add { name: String, rating: Rating },

    /// Delete a player from the pool and from their team
    Remove { player: String },

    /// Change a player's name
    Rename { player: String, name: String },

    /// Change a player's grade
    Rate { player: String, rating: Rating },
}

/// Report printed by `balance` and `show`.
#[derive(Debug, Serialize)]
struct Report {
    teams: Vec<TeamSummary>,
    spread: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    swaps: Option<usize>,
    unassigned: Vec<Player>,
}

/// Run one subcommand against the store, writing human-readable output to `out`.
pub fn run(command: &Command, config: &Config, db: &Database, out: &mut impl Write) -> Result<()> {
    let mut players = db.load_players().context("failed to load players")?;
    let mut teams = db.load_teams().context("failed to load teams")?;
    let capacity = config.league.team_capacity;

    match command {
        Command::Balance { json } => {
            let options = BalanceOptions::from_config(config);
            let outcome = balance::balance_teams_with(&options, &teams, capacity, &players);
            db.sync_teams(&outcome.teams)
                .context("failed to save balanced teams")?;

            let summaries = balance::summarize(&outcome.teams, options.scale);
            let report = Report {
                spread: balance::average_spread(&summaries),
                teams: summaries,
                swaps: Some(outcome.swaps),
                unassigned: outcome.unplaced,
            };
            write_report(out, &report, *json)
        }

        Command::Show { json } => {
            let summaries = balance::summarize(&teams, config.league.rating_scale);
            let report = Report {
                spread: balance::average_spread(&summaries),
                teams: summaries,
                swaps: None,
                unassigned: unassigned_players(&teams, &players)
                    .into_iter()
                    .cloned()
                    .collect(),
            };
            write_report(out, &report, *json)
        }

        Command::Move { player, team: target } => {
            team::move_player(&mut teams, &players, player, target.as_deref(), capacity)?;
            db.sync_teams(&teams).context("failed to save teams")?;
            match target {
                Some(team_id) => writeln!(out, "moved {player} to {team_id}")?,
                None => writeln!(out, "moved {player} to the pool")?,
            }
            Ok(())
        }

        Command::Lock { team: team_id, player } => {
            let locked = team::toggle_lock(&mut teams, team_id, player)?;
            db.sync_teams(&teams).context("failed to save teams")?;
            let state = if locked { "locked" } else { "unlocked" };
            writeln!(out, "{player} {state} on {team_id}")?;
            Ok(())
        }

        Command::Clear => {
            team::clear_teams(&mut teams);
            db.sync_teams(&teams).context("failed to save teams")?;
            writeln!(out, "cleared {} teams", teams.len())?;
            Ok(())
        }

        Command::Import { csv } => {
            let entries = import::load_roster(csv)
                .with_context(|| format!("failed to import {}", csv.display()))?;
            if entries.is_empty() {
                bail!("{} has no usable rows", csv.display());
            }
            let imported = import::players_from_roster(&entries);

            // Ids are positional, so old assignments would point at new people.
            team::clear_teams(&mut teams);
            save(db, &imported, &teams)?;
            info!("Imported {} players from {}", imported.len(), csv.display());
            writeln!(out, "imported {} players; teams cleared", imported.len())?;
            Ok(())
        }

        Command::Add { name, rating } => {
            let added = team::add_player(&mut players, name, *rating)?;
            db.sync_players(&players).context("failed to save players")?;
            writeln!(out, "added {} ({}) as {}", added.name, added.rating, added.id)?;
            Ok(())
        }

        Command::Remove { player } => {
            let removed = team::remove_player(&mut players, &mut teams, player)?;
            save(db, &players, &teams)?;
            writeln!(out, "removed {} ({})", removed.name, removed.id)?;
            Ok(())
        }

        Command::Rename { player, name } => {
            team::rename_player(&mut players, &mut teams, player, name)?;
            db.sync_players(&players).context("failed to save players")?;
            writeln!(out, "renamed {player} to {}", name.trim())?;
            Ok(())
        }

        Command::Rate { player, rating } => {
            team::set_rating(&mut players, &mut teams, player, *rating)?;
            db.sync_players(&players).context("failed to save players")?;
            writeln!(out, "{player} is now {rating}")?;
            Ok(())
        }
    }
}

/// Write rosters first so no assignment references a player about to be deleted.
fn save(db: &Database, players: &[Player], teams: &[Team]) -> Result<()> {
    db.sync_teams(teams).context("failed to save teams")?;
    db.sync_players(players).context("failed to save players")?;
    Ok(())
}

fn write_report(out: &mut impl Write, report: &Report, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("failed to serialize report")?;
        writeln!(out, "{text}")?;
        return Ok(());
    }

    for s in &report.teams {
        writeln!(
            out,
            "{:<12} {} players  avg {:.2}  captains {}",
            s.team_name, s.player_count, s.average, s.captain_count
        )?;
    }
    match report.swaps {
        Some(swaps) => writeln!(out, "spread {:.3} ({swaps} swaps)", report.spread)?,
        None => writeln!(out, "spread {:.3}", report.spread)?,
    }
    if !report.unassigned.is_empty() {
        writeln!(out, "unassigned:")?;
        for p in &report.unassigned {
            writeln!(out, "  {} {} ({})", p.id, p.name, p.rating)?;
        }
    }
    Ok(())
}
