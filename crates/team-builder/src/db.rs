// SQLite persistence layer for players and team assignments.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection};

use crate::roster::team::default_teams;
use crate::roster::{Player, Rating, Team};

/// SQLite-backed storage for the player pool and team rosters.
///
/// Writes are whole-snapshot syncs inside one transaction: the stored pool
/// or team list is made to match the given list exactly.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                rating     TEXT NOT NULL CHECK (rating IN ('A+', 'A', 'A-', 'B+', 'B', 'B-', 'C+', 'C', 'C-', 'D+', 'D', 'D-')),
                sort_order INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                sort_order INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS team_players (
                team_id   TEXT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                is_locked INTEGER NOT NULL DEFAULT 0,
                position  INTEGER NOT NULL,
                PRIMARY KEY (team_id, player_id)
            );

            CREATE INDEX IF NOT EXISTS idx_team_players_team ON team_players(team_id);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    /// Replace the stored player pool with `players`, keeping their order.
    ///
    /// Players already stored are updated in place so their team
    /// assignments survive; players no longer present are deleted, which
    /// cascades to their assignments.
    pub fn sync_players(&self, players: &[Player]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        let keep: HashSet<&str> = players.iter().map(|p| p.id.as_str()).collect();
        let stored: Vec<String> = tx
            .prepare("SELECT id FROM players")
            .context("failed to prepare player id query")?
            .query_map([], |row| row.get(0))
            .context("failed to query player ids")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player id rows")?;
        for id in stored.iter().filter(|id| !keep.contains(id.as_str())) {
            tx.execute("DELETE FROM players WHERE id = ?1", params![id])
                .with_context(|| format!("failed to delete player {id}"))?;
        }

        for (i, player) in players.iter().enumerate() {
            tx.execute(
                "INSERT INTO players (id, name, rating, sort_order) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name       = excluded.name,
                    rating     = excluded.rating,
                    sort_order = excluded.sort_order",
                params![player.id, player.name, player.rating.as_str(), i as i64],
            )
            .with_context(|| format!("failed to upsert player {}", player.id))?;
        }
        tx.commit().context("failed to commit sync_players")?;
        Ok(())
    }

    /// Load the player pool in stored order.
    pub fn load_players(&self) -> Result<Vec<Player>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, rating FROM players ORDER BY sort_order")
            .context("failed to prepare load_players query")?;

        let players = stmt
            .query_map([], |row| {
                Ok(Player {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    rating: parse_rating(row.get(2)?, 2)?,
                })
            })
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;

        Ok(players)
    }

    pub fn player_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .context("failed to count players")?;
        Ok(count as usize)
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    /// Replace all teams and their rosters. Each player's ordinal position
    /// and locked flag are recorded.
    pub fn sync_teams(&self, teams: &[Team]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute("DELETE FROM team_players", [])
            .context("failed to delete team players")?;
        tx.execute("DELETE FROM teams", [])
            .context("failed to delete teams")?;

        for (i, team) in teams.iter().enumerate() {
            tx.execute(
                "INSERT INTO teams (id, name, sort_order) VALUES (?1, ?2, ?3)",
                params![team.id, team.name, i as i64],
            )
            .with_context(|| format!("failed to insert team {}", team.id))?;

            for (position, player) in team.players.iter().enumerate() {
                tx.execute(
                    "INSERT INTO team_players (team_id, player_id, is_locked, position)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        team.id,
                        player.id,
                        team.is_locked(&player.id),
                        position as i64
                    ],
                )
                .with_context(|| {
                    format!("failed to assign player {} to team {}", player.id, team.id)
                })?;
            }
        }

        tx.commit().context("failed to commit sync_teams")?;
        Ok(())
    }

    /// Load teams in stored order, each with its roster in position order and
    /// its lock set rebuilt from the per-player flag.
    pub fn load_teams(&self) -> Result<Vec<Team>> {
        let conn = self.conn();

        let mut teams: Vec<Team> = conn
            .prepare("SELECT id, name FROM teams ORDER BY sort_order")
            .context("failed to prepare load_teams query")?
            .query_map([], |row| Ok(Team::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .context("failed to query teams")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map team rows")?;

        let index: HashMap<String, usize> = teams
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        let mut stmt = conn
            .prepare(
                "SELECT tp.team_id, tp.is_locked, p.id, p.name, p.rating
                 FROM team_players tp
                 JOIN players p ON tp.player_id = p.id
                 ORDER BY tp.team_id, tp.position",
            )
            .context("failed to prepare team_players query")?;

        let rows = stmt
            .query_map([], |row| {
                let team_id: String = row.get(0)?;
                let is_locked: bool = row.get(1)?;
                let player = Player {
                    id: row.get(2)?,
                    name: row.get(3)?,
                    rating: parse_rating(row.get(4)?, 4)?,
                };
                Ok((team_id, is_locked, player))
            })
            .context("failed to query team players")?;

        for row in rows {
            let (team_id, is_locked, player) = row.context("failed to map team player row")?;
            let Some(&idx) = index.get(&team_id) else {
                continue;
            };
            if is_locked {
                teams[idx].locked_players.insert(player.id.clone());
            }
            teams[idx].players.push(player);
        }

        Ok(teams)
    }

    /// Create `count` default teams if none are stored. Returns `true` when
    /// teams were created.
    pub fn ensure_teams(&self, count: usize) -> Result<bool> {
        let existing: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))
            .context("failed to count teams")?;
        if existing > 0 {
            return Ok(false);
        }
        self.sync_teams(&default_teams(count))?;
        Ok(true)
    }
}

fn parse_rating(raw: String, column: usize) -> rusqlite::Result<Rating> {
    raw.parse::<Rating>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
