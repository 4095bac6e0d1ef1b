// Initial seeding: split locked from movable players, then snake-draft the
// movable pool onto the teams.

use std::collections::BTreeSet;

use tracing::debug;

use crate::roster::team::unassigned_players;
use crate::roster::{Player, RatingScale, Team};

/// Copy `teams` with each roster reduced to its locked players (order kept),
/// and collect everyone else into one movable pool.
///
/// The pool holds each team's unlocked players in team order, followed by
/// the members of `all_players` that are on no team at all. A lock id only
/// counts when that player is on the team; any other lock id is dropped so
/// it cannot pin a player seated there later.
pub(crate) fn partition(teams: &[Team], all_players: &[Player]) -> (Vec<Team>, Vec<Player>) {
    let mut anchored = Vec::with_capacity(teams.len());
    let mut movable: Vec<Player> = Vec::new();

    for team in teams {
        let kept: Vec<Player> = team
            .players
            .iter()
            .filter(|p| team.is_locked(&p.id))
            .cloned()
            .collect();
        let locked: BTreeSet<String> = kept.iter().map(|p| p.id.clone()).collect();
        if locked.len() < team.locked_players.len() {
            debug!(
                "{}: dropping {} lock(s) for players not on the team",
                team.id,
                team.locked_players.len() - locked.len()
            );
        }

        movable.extend(team.movable_players().cloned());
        anchored.push(Team {
            id: team.id.clone(),
            name: team.name.clone(),
            players: kept,
            locked_players: locked,
        });
    }

    movable.extend(unassigned_players(teams, all_players).into_iter().cloned());

    (anchored, movable)
}

/// Walks team indices 0..N-1 then N-1..0, reversing at each end. The end
/// team picks twice in a row, as in a draft.
#[derive(Debug)]
struct SnakeCursor {
    idx: usize,
    forward: bool,
    len: usize,
}

impl SnakeCursor {
    fn new(len: usize) -> Self {
        SnakeCursor {
            idx: 0,
            forward: true,
            len,
        }
    }

    fn advance(&mut self) {
        if self.len <= 1 {
            return;
        }
        if self.forward {
            if self.idx + 1 == self.len {
                self.forward = false;
            } else {
                self.idx += 1;
            }
        } else if self.idx == 0 {
            self.forward = true;
        } else {
            self.idx -= 1;
        }
    }
}

/// Seat `movable` onto `teams` best-first in snake order, skipping teams at
/// `capacity`. Returns the players that found no open seat.
///
/// Sorting is stable, so equal scores keep their pool order.
pub(crate) fn snake_draft(
    teams: &mut [Team],
    mut movable: Vec<Player>,
    capacity: usize,
    scale: RatingScale,
) -> Vec<Player> {
    movable.sort_by(|a, b| scale.score(b.rating).total_cmp(&scale.score(a.rating)));

    let mut unplaced = Vec::new();
    let mut cursor = SnakeCursor::new(teams.len());

    for player in movable {
        if teams.iter().all(|t| t.players.len() >= capacity) {
            unplaced.push(player);
            continue;
        }
        // An open seat exists, so a full lap of the snake (2N steps) finds it.
        while teams[cursor.idx].players.len() >= capacity {
            cursor.advance();
        }
        teams[cursor.idx].players.push(player);
        cursor.advance();
    }

    unplaced
}
