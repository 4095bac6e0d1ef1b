// Players, teams, and the roster-level operations that move players between them.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rating::{Rating, RatingScale};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("player not found: {0}")]
    UnknownPlayer(String),

    #[error("team not found: {0}")]
    UnknownTeam(String),

    #[error("player {player_id} is locked to team {team_id}")]
    Locked { player_id: String, team_id: String },

    #[error("team {team_id} already has {capacity} players")]
    TeamFull { team_id: String, capacity: usize },

    #[error("player {player_id} is not on team {team_id}")]
    NotOnTeam { player_id: String, team_id: String },

    #[error("player name must not be blank")]
    BlankName,
}

/// A rated player. The balancer only reads `id` and `rating`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub rating: Rating,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rating: Rating) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            rating,
        }
    }
}

/// A team and its ordered roster.
///
/// `locked_players` holds the ids pinned to this team (captains). A locked id
/// is always expected to be present in `players`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub locked_players: BTreeSet<String>,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Team {
            id: id.into(),
            name: name.into(),
            players: Vec::new(),
            locked_players: BTreeSet::new(),
        }
    }

    pub fn is_locked(&self, player_id: &str) -> bool {
        self.locked_players.contains(player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Players on this team that are not locked, in roster order.
    pub fn movable_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !self.is_locked(&p.id))
    }

    /// Mean score of the current roster, 0.0 for an empty team.
    pub fn average_score(&self, scale: RatingScale) -> f64 {
        if self.players.is_empty() {
            return 0.0;
        }
        let total: f64 = self.players.iter().map(|p| scale.score(p.rating)).sum();
        total / self.players.len() as f64
    }
}

/// `count` empty teams with ids `team-1..team-N` and names `Team 1..Team N`.
pub fn default_teams(count: usize) -> Vec<Team> {
    (1..=count)
        .map(|i| Team::new(format!("team-{i}"), format!("Team {i}")))
        .collect()
}

/// Pool members that are not on any team, in pool order.
pub fn unassigned_players<'a>(teams: &[Team], all_players: &'a [Player]) -> Vec<&'a Player> {
    let assigned: HashSet<&str> = teams
        .iter()
        .flat_map(|t| t.players.iter().map(|p| p.id.as_str()))
        .collect();
    all_players
        .iter()
        .filter(|p| !assigned.contains(p.id.as_str()))
        .collect()
}

/// Move a player onto `target` (a team id), or back to the pool when `target`
/// is `None`.
///
/// The player is looked up on the teams first, then in `all_players`. Locked
/// players cannot be moved off their team, and a team at `capacity` accepts
/// nobody new. Moving a player onto the team it is already on is a no-op.
pub fn move_player(
    teams: &mut [Team],
    all_players: &[Player],
    player_id: &str,
    target: Option<&str>,
    capacity: usize,
) -> Result<(), AssignError> {
    let source_idx = teams.iter().position(|t| t.has_player(player_id));

    let player = match source_idx {
        Some(idx) => teams[idx]
            .players
            .iter()
            .find(|p| p.id == player_id)
            .cloned(),
        None => all_players.iter().find(|p| p.id == player_id).cloned(),
    }
    .ok_or_else(|| AssignError::UnknownPlayer(player_id.to_string()))?;

    let target_idx = match target {
        Some(team_id) => Some(
            teams
                .iter()
                .position(|t| t.id == team_id)
                .ok_or_else(|| AssignError::UnknownTeam(team_id.to_string()))?,
        ),
        None => None,
    };

    if source_idx == target_idx {
        return Ok(());
    }

    if let Some(src) = source_idx {
        if teams[src].is_locked(player_id) {
            return Err(AssignError::Locked {
                player_id: player_id.to_string(),
                team_id: teams[src].id.clone(),
            });
        }
    }

    if let Some(dst) = target_idx {
        if teams[dst].players.len() >= capacity {
            return Err(AssignError::TeamFull {
                team_id: teams[dst].id.clone(),
                capacity,
            });
        }
    }

    if let Some(src) = source_idx {
        teams[src].players.retain(|p| p.id != player_id);
    }
    if let Some(dst) = target_idx {
        teams[dst].players.push(player);
    }
    Ok(())
}

/// Lock or unlock a player on the given team. Returns the new lock state.
pub fn toggle_lock(teams: &mut [Team], team_id: &str, player_id: &str) -> Result<bool, AssignError> {
    let team = teams
        .iter_mut()
        .find(|t| t.id == team_id)
        .ok_or_else(|| AssignError::UnknownTeam(team_id.to_string()))?;

    if !team.has_player(player_id) {
        return Err(AssignError::NotOnTeam {
            player_id: player_id.to_string(),
            team_id: team_id.to_string(),
        });
    }

    if team.locked_players.remove(player_id) {
        Ok(false)
    } else {
        team.locked_players.insert(player_id.to_string());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Pool edits
// ---------------------------------------------------------------------------

/// Add a player to the pool under the next unused `player-N` id.
pub fn add_player(
    all_players: &mut Vec<Player>,
    name: &str,
    rating: Rating,
) -> Result<Player, AssignError> {
    let name = non_blank(name)?;
    let next = all_players
        .iter()
        .filter_map(|p| p.id.strip_prefix("player-")?.parse::<usize>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    let player = Player::new(format!("player-{next}"), name, rating);
    all_players.push(player.clone());
    Ok(player)
}

/// Delete a player from the pool, from whatever team holds them, and from
/// every lock set.
pub fn remove_player(
    all_players: &mut Vec<Player>,
    teams: &mut [Team],
    player_id: &str,
) -> Result<Player, AssignError> {
    let idx = all_players
        .iter()
        .position(|p| p.id == player_id)
        .ok_or_else(|| AssignError::UnknownPlayer(player_id.to_string()))?;
    let removed = all_players.remove(idx);

    for team in teams.iter_mut() {
        team.players.retain(|p| p.id != player_id);
        team.locked_players.remove(player_id);
    }
    Ok(removed)
}

pub fn rename_player(
    all_players: &mut [Player],
    teams: &mut [Team],
    player_id: &str,
    name: &str,
) -> Result<(), AssignError> {
    let name = non_blank(name)?;
    update_player(all_players, teams, player_id, |p| p.name = name.clone())
}

pub fn set_rating(
    all_players: &mut [Player],
    teams: &mut [Team],
    player_id: &str,
    rating: Rating,
) -> Result<(), AssignError> {
    update_player(all_players, teams, player_id, |p| p.rating = rating)
}

/// Apply `edit` to the pool entry and to any rostered copy of the player.
fn update_player(
    all_players: &mut [Player],
    teams: &mut [Team],
    player_id: &str,
    edit: impl Fn(&mut Player),
) -> Result<(), AssignError> {
    let player = all_players
        .iter_mut()
        .find(|p| p.id == player_id)
        .ok_or_else(|| AssignError::UnknownPlayer(player_id.to_string()))?;
    edit(player);

    for rostered in teams
        .iter_mut()
        .flat_map(|t| t.players.iter_mut())
        .filter(|p| p.id == player_id)
    {
        edit(rostered);
    }
    Ok(())
}

fn non_blank(name: &str) -> Result<String, AssignError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AssignError::BlankName);
    }
    Ok(name.to_string())
}

/// Empty every roster and drop every lock.
pub fn clear_teams(teams: &mut [Team]) {
    for team in teams {
        team.players.clear();
        team.locked_players.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<Player> {
        vec![
            Player::new("p1", "Don", Rating::A),
            Player::new("p2", "Kevin", Rating::AMinus),
            Player::new("p3", "Mom", Rating::DPlus),
            Player::new("p4", "Scott", Rating::CMinus),
        ]
    }

    #[test]
    fn default_teams_are_numbered_from_one() {
        let teams = default_teams(3);
        assert_eq!(teams.len(), 3);
        assert_eq!(teams[0].id, "team-1");
        assert_eq!(teams[2].name, "Team 3");
        assert!(teams.iter().all(|t| t.players.is_empty()));
    }

    #[test]
    fn unassigned_excludes_rostered_players() {
        let all = pool();
        let mut teams = default_teams(2);
        teams[0].players.push(all[1].clone());

        let free: Vec<&str> = unassigned_players(&teams, &all)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(free, vec!["p1", "p3", "p4"]);
    }

    #[test]
    fn average_score_of_empty_team_is_zero() {
        let team = Team::new("t", "T");
        assert_eq!(team.average_score(RatingScale::PlusMinus), 0.0);
    }

    #[test]
    fn average_score_uses_scale() {
        let all = pool();
        let mut team = Team::new("t", "T");
        team.players = vec![all[0].clone(), all[2].clone()];
        let avg = team.average_score(RatingScale::PlusMinus);
        assert!((avg - 2.65).abs() < 1e-9);
        let avg = team.average_score(RatingScale::Letter);
        assert!((avg - 2.5).abs() < 1e-9);
    }

    #[test]
    fn move_from_pool_to_team() {
        let all = pool();
        let mut teams = default_teams(2);
        move_player(&mut teams, &all, "p1", Some("team-2"), 4).unwrap();
        assert_eq!(teams[1].players[0].id, "p1");
        assert!(teams[0].players.is_empty());
    }

    #[test]
    fn move_between_teams_and_back_to_pool() {
        let all = pool();
        let mut teams = default_teams(2);
        move_player(&mut teams, &all, "p1", Some("team-1"), 4).unwrap();
        move_player(&mut teams, &all, "p1", Some("team-2"), 4).unwrap();
        assert!(teams[0].players.is_empty());
        assert_eq!(teams[1].players.len(), 1);

        move_player(&mut teams, &all, "p1", None, 4).unwrap();
        assert!(teams.iter().all(|t| t.players.is_empty()));
    }

    #[test]
    fn move_to_same_team_is_noop() {
        let all = pool();
        let mut teams = default_teams(1);
        move_player(&mut teams, &all, "p1", Some("team-1"), 1).unwrap();
        // Team is full, but moving onto its own team must not fail.
        move_player(&mut teams, &all, "p1", Some("team-1"), 1).unwrap();
        assert_eq!(teams[0].players.len(), 1);
    }

    #[test]
    fn move_rejects_full_team() {
        let all = pool();
        let mut teams = default_teams(1);
        move_player(&mut teams, &all, "p1", Some("team-1"), 1).unwrap();
        let err = move_player(&mut teams, &all, "p2", Some("team-1"), 1).unwrap_err();
        assert_eq!(
            err,
            AssignError::TeamFull {
                team_id: "team-1".into(),
                capacity: 1
            }
        );
    }

    #[test]
    fn move_rejects_locked_player() {
        let all = pool();
        let mut teams = default_teams(2);
        move_player(&mut teams, &all, "p1", Some("team-1"), 4).unwrap();
        toggle_lock(&mut teams, "team-1", "p1").unwrap();

        let err = move_player(&mut teams, &all, "p1", Some("team-2"), 4).unwrap_err();
        assert!(matches!(err, AssignError::Locked { .. }));
        let err = move_player(&mut teams, &all, "p1", None, 4).unwrap_err();
        assert!(matches!(err, AssignError::Locked { .. }));
        assert!(teams[0].has_player("p1"));
    }

    #[test]
    fn move_rejects_unknown_ids() {
        let all = pool();
        let mut teams = default_teams(1);
        assert_eq!(
            move_player(&mut teams, &all, "ghost", Some("team-1"), 4).unwrap_err(),
            AssignError::UnknownPlayer("ghost".into())
        );
        assert_eq!(
            move_player(&mut teams, &all, "p1", Some("team-9"), 4).unwrap_err(),
            AssignError::UnknownTeam("team-9".into())
        );
    }

    #[test]
    fn toggle_lock_flips_state() {
        let all = pool();
        let mut teams = default_teams(1);
        move_player(&mut teams, &all, "p3", Some("team-1"), 4).unwrap();

        assert!(toggle_lock(&mut teams, "team-1", "p3").unwrap());
        assert!(teams[0].is_locked("p3"));
        assert!(!toggle_lock(&mut teams, "team-1", "p3").unwrap());
        assert!(!teams[0].is_locked("p3"));
    }

    #[test]
    fn toggle_lock_requires_membership() {
        let mut teams = default_teams(1);
        let err = toggle_lock(&mut teams, "team-1", "p1").unwrap_err();
        assert!(matches!(err, AssignError::NotOnTeam { .. }));
    }

    #[test]
    fn clear_teams_drops_players_and_locks() {
        let all = pool();
        let mut teams = default_teams(2);
        move_player(&mut teams, &all, "p1", Some("team-1"), 4).unwrap();
        toggle_lock(&mut teams, "team-1", "p1").unwrap();

        clear_teams(&mut teams);
        assert!(teams[0].players.is_empty());
        assert!(teams[0].locked_players.is_empty());
    }

    #[test]
    fn team_wire_format_uses_locked_players_array() {
        let all = pool();
        let mut team = Team::new("team-1", "Team 1");
        team.players.push(all[0].clone());
        team.locked_players.insert("p1".into());

        let value = serde_json::to_value(&team).unwrap();
        assert_eq!(value["lockedPlayers"], serde_json::json!(["p1"]));
        assert_eq!(value["players"][0]["rating"], "A");

        let parsed: Team = serde_json::from_str(
            r#"{"id":"team-2","name":"Team 2","players":[{"id":"p9","name":"X","rating":"C+"}]}"#,
        )
        .unwrap();
        assert!(parsed.locked_players.is_empty());
        assert_eq!(parsed.players[0].rating, Rating::CPlus);
    }

    #[test]
    fn add_player_takes_next_free_id() {
        let mut all = players_from_ids(&["player-1", "player-7", "p3"]);
        let added = add_player(&mut all, "  Uncle Tim ", Rating::C).unwrap();
        assert_eq!(added.id, "player-8");
        assert_eq!(added.name, "Uncle Tim");
        assert_eq!(all.last(), Some(&added));

        let mut empty = Vec::new();
        assert_eq!(add_player(&mut empty, "Pops", Rating::BMinus).unwrap().id, "player-1");
    }

    #[test]
    fn add_player_rejects_blank_name() {
        let mut all = pool();
        assert_eq!(add_player(&mut all, "   ", Rating::A).unwrap_err(), AssignError::BlankName);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn remove_player_clears_roster_and_lock() {
        let mut all = pool();
        let mut teams = default_teams(2);
        move_player(&mut teams, &all, "p1", Some("team-1"), 4).unwrap();
        move_player(&mut teams, &all, "p2", Some("team-1"), 4).unwrap();
        toggle_lock(&mut teams, "team-1", "p1").unwrap();

        let removed = remove_player(&mut all, &mut teams, "p1").unwrap();
        assert_eq!(removed.name, "Don");
        assert!(all.iter().all(|p| p.id != "p1"));
        assert!(!teams[0].has_player("p1"));
        assert!(!teams[0].is_locked("p1"));
        assert!(teams[0].has_player("p2"));
    }

    #[test]
    fn remove_unknown_player_fails() {
        let mut all = pool();
        let mut teams = default_teams(1);
        assert_eq!(
            remove_player(&mut all, &mut teams, "ghost").unwrap_err(),
            AssignError::UnknownPlayer("ghost".into())
        );
    }

    #[test]
    fn rename_updates_pool_and_rostered_copy() {
        let mut all = pool();
        let mut teams = default_teams(1);
        move_player(&mut teams, &all, "p3", Some("team-1"), 4).unwrap();

        rename_player(&mut all, &mut teams, "p3", "Mother").unwrap();
        assert_eq!(all[2].name, "Mother");
        assert_eq!(teams[0].players[0].name, "Mother");

        assert_eq!(
            rename_player(&mut all, &mut teams, "p3", "").unwrap_err(),
            AssignError::BlankName
        );
        assert_eq!(all[2].name, "Mother");
    }

    #[test]
    fn set_rating_changes_team_average() {
        let mut all = pool();
        let mut teams = default_teams(1);
        move_player(&mut teams, &all, "p4", Some("team-1"), 4).unwrap();

        set_rating(&mut all, &mut teams, "p4", Rating::BPlus).unwrap();
        assert_eq!(all[3].rating, Rating::BPlus);
        assert!((teams[0].average_score(RatingScale::PlusMinus) - 3.3).abs() < 1e-9);

        assert!(matches!(
            set_rating(&mut all, &mut teams, "ghost", Rating::A),
            Err(AssignError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn movable_players_skips_locked() {
        let all = pool();
        let mut team = Team::new("t", "T");
        team.players = all.clone();
        team.locked_players.insert("p2".into());
        let ids: Vec<&str> = team.movable_players().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3", "p4"]);
    }

    fn players_from_ids(ids: &[&str]) -> Vec<Player> {
        ids.iter().map(|id| Player::new(*id, *id, Rating::C)).collect()
    }
}
