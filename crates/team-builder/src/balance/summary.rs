// Per-team statistics for display after a balance or manual edit.

use serde::Serialize;

use crate::roster::{RatingScale, Team};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team_id: String,
    pub team_name: String,
    pub player_count: usize,
    /// Mean score, 0.0 for an empty team.
    pub average: f64,
    /// Locked players actually present on the roster.
    pub captain_count: usize,
}

pub fn summarize(teams: &[Team], scale: RatingScale) -> Vec<TeamSummary> {
    teams
        .iter()
        .map(|team| TeamSummary {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            player_count: team.players.len(),
            average: team.average_score(scale),
            captain_count: team.players.iter().filter(|p| team.is_locked(&p.id)).count(),
        })
        .collect()
}

/// Population standard deviation of the team averages.
pub fn average_spread(summaries: &[TeamSummary]) -> f64 {
    if summaries.is_empty() {
        return 0.0;
    }
    let n = summaries.len() as f64;
    let mean = summaries.iter().map(|s| s.average).sum::<f64>() / n;
    let var = summaries
        .iter()
        .map(|s| (s.average - mean).powi(2))
        .sum::<f64>()
        / n;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::team::default_teams;
    use crate::roster::{Player, Rating};

    #[test]
    fn counts_only_rostered_captains() {
        let mut teams = default_teams(2);
        teams[0].players = vec![
            Player::new("a", "Don", Rating::A),
            Player::new("b", "Mom", Rating::D),
        ];
        teams[0].locked_players.insert("a".into());
        // Stale lock on a player no longer rostered.
        teams[1].locked_players.insert("zzz".into());

        let summaries = summarize(&teams, RatingScale::Letter);
        assert_eq!(summaries[0].player_count, 2);
        assert_eq!(summaries[0].captain_count, 1);
        assert!((summaries[0].average - 2.5).abs() < 1e-9);
        assert_eq!(summaries[1].player_count, 0);
        assert_eq!(summaries[1].captain_count, 0);
        assert_eq!(summaries[1].average, 0.0);
    }

    #[test]
    fn spread_of_identical_averages_is_zero() {
        let mut teams = default_teams(2);
        teams[0].players = vec![Player::new("a", "A", Rating::B)];
        teams[1].players = vec![Player::new("b", "B", Rating::B)];
        let summaries = summarize(&teams, RatingScale::PlusMinus);
        assert_eq!(average_spread(&summaries), 0.0);
    }

    #[test]
    fn spread_is_population_std_dev() {
        let mut teams = default_teams(2);
        teams[0].players = vec![Player::new("a", "A", Rating::A)];
        teams[1].players = vec![Player::new("b", "B", Rating::C)];
        let summaries = summarize(&teams, RatingScale::PlusMinus);
        assert!((average_spread(&summaries) - 1.0).abs() < 1e-9);
    }
}
