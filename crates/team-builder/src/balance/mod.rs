// Team balancing: snake-draft seeding followed by swap-based local search.
//
// Locked players never move. Everyone else (unlocked team members plus the
// unassigned pool) is redistributed so that per-team average scores end up
// as close to each other as the search can get them.

pub mod search;
pub mod seed;
pub mod summary;

use tracing::info;

use crate::config::Config;
use crate::roster::{Player, RatingScale, Team};

pub use search::{average_variance, team_averages};
pub use summary::{average_spread, summarize, TeamSummary};

/// Upper bound on committed swaps per balance run.
pub const DEFAULT_MAX_PASSES: usize = 50;

/// Minimum objective improvement for a swap to count.
pub const DEFAULT_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceOptions {
    pub scale: RatingScale,
    pub max_passes: usize,
    pub epsilon: f64,
}

impl Default for BalanceOptions {
    fn default() -> Self {
        BalanceOptions {
            scale: RatingScale::PlusMinus,
            max_passes: DEFAULT_MAX_PASSES,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl BalanceOptions {
    pub fn from_config(config: &Config) -> Self {
        BalanceOptions {
            scale: config.league.rating_scale,
            max_passes: config.balance.max_passes,
            epsilon: config.balance.epsilon,
        }
    }
}

/// Result of a balance run.
#[derive(Debug, Clone)]
pub struct BalanceOutcome {
    /// Same teams in the same order. Lock sets keep only the ids that were on
    /// their team in the input.
    pub teams: Vec<Team>,
    /// Movable players left without a seat because every team was full.
    pub unplaced: Vec<Player>,
    /// Swaps committed by the local search.
    pub swaps: usize,
    /// Objective right after snake-draft seeding.
    pub variance_before: f64,
    /// Objective after local search. Never greater than `variance_before`.
    pub variance_after: f64,
}

/// Balance with the default scale, pass cap and epsilon.
pub fn balance_teams(teams: &[Team], capacity: usize, all_players: &[Player]) -> BalanceOutcome {
    balance_teams_with(&BalanceOptions::default(), teams, capacity, all_players)
}

/// Redistribute every unlocked and unassigned player across `teams`.
///
/// 1. Keep each team's locked players in place; pool everyone else along
///    with the players in `all_players` who are on no team.
/// 2. Seat the pool best-first in snake order, skipping full teams.
/// 3. Swap pairs of unlocked players between teams while doing so lowers
///    the variance of team averages, up to `max_passes` swaps.
///
/// The input is not modified. A pool larger than the open seats is not an
/// error: the overflow comes back in `unplaced`.
pub fn balance_teams_with(
    options: &BalanceOptions,
    teams: &[Team],
    capacity: usize,
    all_players: &[Player],
) -> BalanceOutcome {
    let (mut working, movable) = seed::partition(teams, all_players);

    if movable.is_empty() {
        let variance = average_variance(&team_averages(&working, options.scale));
        return BalanceOutcome {
            teams: working,
            unplaced: Vec::new(),
            swaps: 0,
            variance_before: variance,
            variance_after: variance,
        };
    }

    let pool_size = movable.len();
    let unplaced = seed::snake_draft(&mut working, movable, capacity, options.scale);
    let variance_before = average_variance(&team_averages(&working, options.scale));

    let swaps = search::improve(&mut working, options.scale, options.max_passes, options.epsilon);
    let variance_after = average_variance(&team_averages(&working, options.scale));

    info!(
        "balanced {} movable players across {} teams: {} swaps, variance {:.4} -> {:.4}, {} unplaced",
        pool_size,
        working.len(),
        swaps,
        variance_before,
        variance_after,
        unplaced.len()
    );

    BalanceOutcome {
        teams: working,
        unplaced,
        swaps,
        variance_before,
        variance_after,
    }
}
