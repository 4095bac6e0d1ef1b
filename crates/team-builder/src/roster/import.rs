// Roster import from CSV (`name,rating` per row).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::rating::Rating;
use super::team::Player;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open roster file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to read roster CSV {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// One row of the default roster: a name and its grade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub rating: Rating,
}

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    name: String,
    rating: String,
}

/// Load roster entries from a CSV file with `name,rating` headers.
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_roster_from_reader(file).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Reader-based loader. Rows with a blank name or an unknown grade are
/// skipped with a warning rather than failing the whole import.
pub fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterEntry>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
                continue;
            }
        };
        if raw.name.is_empty() {
            warn!("skipping roster row with blank name");
            continue;
        }
        match raw.rating.parse::<Rating>() {
            Ok(rating) => entries.push(RosterEntry {
                name: raw.name,
                rating,
            }),
            Err(e) => warn!("skipping roster row '{}': {}", raw.name, e),
        }
    }
    Ok(entries)
}

/// Turn roster entries into players with ids `player-1..player-N` in file order.
///
/// Names need not be unique (placeholder rows such as "TBD" repeat), so ids
/// are positional.
pub fn players_from_roster(entries: &[RosterEntry]) -> Vec<Player> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| Player::new(format!("player-{}", i + 1), e.name.clone(), e.rating))
        .collect()
}
