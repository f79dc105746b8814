use std::collections::{BTreeMap, HashMap};

use super::models::{GameStat, PlacementSlice, StatisticsSummary};
use crate::sessions::models::SessionPlayerRecord;

const TOP_GAMES_LIMIT: usize = 10;

/// Percentage rounded half up, in integer arithmetic
pub fn win_rate(wins: u32, played: u32) -> u32 {
    if played == 0 {
        return 0;
    }
    let (wins, played) = (u64::from(wins), u64::from(played));
    ((wins * 100 + played / 2) / played) as u32
}

#[derive(Debug, Default)]
struct GameTally {
    played: u32,
    wins: u32,
}

/// Summarizes every recorded result of one user.
///
/// `game_names` maps game ids to names; per-game stats are grouped by name and
/// games missing from it are grouped under their id.
pub fn summarize(
    user_id: &str,
    display_name: &str,
    records: &[SessionPlayerRecord],
    game_names: &HashMap<String, String>,
) -> StatisticsSummary {
    let mut wins = 0;
    let mut second = 0;
    let mut third = 0;
    let mut last = 0;
    let mut games: BTreeMap<&str, GameTally> = BTreeMap::new();

    for record in records {
        match record.placement {
            1 => wins += 1,
            2 => second += 1,
            3 => third += 1,
            _ => {}
        }
        if record.player_count > 1 && record.placement == record.player_count {
            last += 1;
        }

        let name = game_names
            .get(&record.game_id)
            .map(String::as_str)
            .unwrap_or(record.game_id.as_str());
        let tally = games.entry(name).or_default();
        tally.played += 1;
        if record.placement == 1 {
            tally.wins += 1;
        }
    }

    let total_games = records.len() as u32;
    let per_game: Vec<GameStat> = games
        .into_iter()
        .map(|(name, tally)| GameStat {
            game_name: name.to_string(),
            played: tally.played,
            wins: tally.wins,
            win_rate: win_rate(tally.wins, tally.played),
        })
        .collect();

    // per_game is already in name order, so a stable sort keeps name as the tie-break
    let mut top_games = per_game.clone();
    top_games.sort_by(|a, b| b.played.cmp(&a.played));
    top_games.truncate(TOP_GAMES_LIMIT);

    StatisticsSummary {
        user_id: user_id.to_string(),
        display_name: display_name.to_string(),
        total_games,
        wins,
        second,
        third,
        last,
        per_game,
        top_games,
        placement_distribution: placement_distribution(total_games, wins, second, third),
    }
}

fn placement_distribution(total: u32, wins: u32, second: u32, third: u32) -> Vec<PlacementSlice> {
    let rest = total.saturating_sub(wins + second + third);
    [("1st", wins), ("2nd", second), ("3rd", third), ("4th+", rest)]
        .into_iter()
        .filter(|(_, value)| *value > 0)
        .map(|(label, value)| PlacementSlice::new(label, value))
        .collect()
}
