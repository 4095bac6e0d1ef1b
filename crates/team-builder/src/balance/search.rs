// Pairwise-swap local search over team averages.
//
// Objective: sum over teams of (team average - mean of team averages)^2.
// The search is greedy first-improvement: the first swap that lowers the
// objective by more than epsilon is committed and the scan restarts.

use tracing::debug;

use crate::roster::{RatingScale, Team};

/// Mean score of each team, 0.0 for empty teams.
pub fn team_averages(teams: &[Team], scale: RatingScale) -> Vec<f64> {
    teams.iter().map(|t| t.average_score(scale)).collect()
}

/// Sum of squared deviations of each average from the mean of the averages.
pub fn average_variance(averages: &[f64]) -> f64 {
    if averages.is_empty() {
        return 0.0;
    }
    let mean = averages.iter().sum::<f64>() / averages.len() as f64;
    averages.iter().map(|a| (a - mean).powi(2)).sum()
}

/// Objective after replacing the averages of teams `i` and `j`.
fn variance_with(averages: &[f64], i: usize, avg_i: f64, j: usize, avg_j: f64) -> f64 {
    let value = |k: usize| match k {
        k if k == i => avg_i,
        k if k == j => avg_j,
        k => averages[k],
    };
    let n = averages.len() as f64;
    let mean = (0..averages.len()).map(value).sum::<f64>() / n;
    (0..averages.len()).map(|k| (value(k) - mean).powi(2)).sum()
}

/// Exchange of `teams[team_a].players[seat_a]` with `teams[team_b].players[seat_b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Swap {
    pub team_a: usize,
    pub seat_a: usize,
    pub team_b: usize,
    pub seat_b: usize,
}

/// First swap of two unlocked players that lowers the objective by more than
/// `epsilon`, scanning team pairs (i < j) in order.
///
/// Pairs whose roster sizes differ by more than one are skipped.
pub(crate) fn find_improving_swap(teams: &[Team], scale: RatingScale, epsilon: f64) -> Option<Swap> {
    let averages = team_averages(teams, scale);
    let current = average_variance(&averages);

    for i in 0..teams.len() {
        for j in (i + 1)..teams.len() {
            let (a, b) = (&teams[i], &teams[j]);
            if a.players.len().abs_diff(b.players.len()) > 1 {
                continue;
            }
            let len_a = a.players.len() as f64;
            let len_b = b.players.len() as f64;
            let sum_a: f64 = a.players.iter().map(|p| scale.score(p.rating)).sum();
            let sum_b: f64 = b.players.iter().map(|p| scale.score(p.rating)).sum();

            for (seat_a, pa) in a.players.iter().enumerate() {
                if a.is_locked(&pa.id) {
                    continue;
                }
                let score_a = scale.score(pa.rating);
                for (seat_b, pb) in b.players.iter().enumerate() {
                    if b.is_locked(&pb.id) {
                        continue;
                    }
                    let score_b = scale.score(pb.rating);
                    let next_a = (sum_a - score_a + score_b) / len_a;
                    let next_b = (sum_b - score_b + score_a) / len_b;
                    if variance_with(&averages, i, next_a, j, next_b) < current - epsilon {
                        return Some(Swap {
                            team_a: i,
                            seat_a,
                            team_b: j,
                            seat_b,
                        });
                    }
                }
            }
        }
    }
    None
}

pub(crate) fn apply_swap(teams: &mut [Team], swap: Swap) {
    let (left, right) = teams.split_at_mut(swap.team_b);
    std::mem::swap(
        &mut left[swap.team_a].players[swap.seat_a],
        &mut right[0].players[swap.seat_b],
    );
}

/// Run the local search in place for at most `max_passes` committed swaps.
/// Returns the number of swaps made.
pub(crate) fn improve(teams: &mut [Team], scale: RatingScale, max_passes: usize, epsilon: f64) -> usize {
    let mut swaps = 0;
    while swaps < max_passes {
        let Some(swap) = find_improving_swap(teams, scale, epsilon) else {
            break;
        };
        debug!(
            "swap {} ({}) <-> {} ({})",
            teams[swap.team_a].players[swap.seat_a].id,
            teams[swap.team_a].id,
            teams[swap.team_b].players[swap.seat_b].id,
            teams[swap.team_b].id,
        );
        apply_swap(teams, swap);
        swaps += 1;
    }
    swaps
}
