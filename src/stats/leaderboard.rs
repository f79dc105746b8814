use std::cmp::Ordering;
use std::collections::HashMap;

use super::models::LeaderboardEntry;
use crate::sessions::models::SessionPlayerRecord;

#[derive(Debug, Default)]
struct Tally {
    points: i64,
    games: u32,
    placement_sum: i64,
}

impl Tally {
    /// Compares average placements without going through floats
    fn cmp_average(&self, other: &Tally) -> Ordering {
        (self.placement_sum * i64::from(other.games))
            .cmp(&(other.placement_sum * i64::from(self.games)))
    }

    fn average(&self) -> f64 {
        self.placement_sum as f64 / f64::from(self.games)
    }
}

/// Ranks every user that appears in `records` by total league points, then
/// lower average placement, then user id.
///
/// `names` maps user ids to display names; users missing from it are shown
/// under their id.
pub fn build_leaderboard(
    records: &[SessionPlayerRecord],
    names: &HashMap<String, String>,
) -> Vec<LeaderboardEntry> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for record in records {
        let tally = tallies.entry(record.user_id.as_str()).or_default();
        tally.points += i64::from(record.points_awarded);
        tally.games += 1;
        tally.placement_sum += i64::from(record.placement);
    }

    let mut ranked: Vec<(&str, Tally)> = tallies.into_iter().collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.cmp_average(b))
            .then_with(|| a_id.cmp(b_id))
    });

    ranked
        .into_iter()
        .map(|(user_id, tally)| LeaderboardEntry {
            user_id: user_id.to_string(),
            name: names
                .get(user_id)
                .cloned()
                .unwrap_or_else(|| user_id.to_string()),
            total_league_points: tally.points,
            games_played: tally.games,
            average_placement: tally.average(),
        })
        .collect()
}
