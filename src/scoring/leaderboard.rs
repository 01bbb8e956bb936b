//! Leaderboard aggregation over already-filtered score records.
//!
//! Two independent algorithms share one input shape:
//! * total score: sum of normalized scores, highest first
//! * rank points: per-game competition ranks summed, lowest first

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, HashMap};

pub const GLOBAL_LEADERBOARD_LIMIT: usize = 20;
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub player_id: String,
    pub display_name: String,
    pub game_id: String,
    pub normalized_score: u8,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub player_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Best submission per player, game and day.
    #[default]
    Daily,
    /// Every submission counts.
    Overall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardKind {
    #[default]
    TotalScore,
    RankPoints,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub display_name: String,
    pub total_score: u64,
    pub games_played: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_points: Option<u64>,
}

#[derive(Default)]
struct Accumulator {
    display_name: String,
    total_score: u64,
    rank_points: u64,
    games: BTreeSet<String>,
}

/// Computes a ranked leaderboard.
///
/// With `members`, every member gets a row (zero if they didn't play) and records
/// from anyone else are ignored. Without it, only players with records appear.
pub fn aggregate(
    records: &[ScoreRecord],
    members: Option<&[Member]>,
    scope: Scope,
    kind: LeaderboardKind,
) -> Vec<LeaderboardEntry> {
    let mut players: HashMap<&str, Accumulator> = HashMap::new();
    if let Some(members) = members {
        for member in members {
            players.insert(
                &member.player_id,
                Accumulator {
                    display_name: member.display_name.clone(),
                    ..Accumulator::default()
                },
            );
        }
    }

    let eligible: Vec<&ScoreRecord> = records
        .iter()
        .filter(|r| members.is_none() || players.contains_key(r.player_id.as_str()))
        .collect();

    match kind {
        LeaderboardKind::TotalScore => {
            let counted = match scope {
                Scope::Daily => best_per_day(&eligible),
                Scope::Overall => eligible,
            };
            for record in counted {
                let acc = accumulator(&mut players, record);
                acc.total_score += u64::from(record.normalized_score);
                acc.games.insert(record.game_id.clone());
            }
        }
        LeaderboardKind::RankPoints => {
            let best = best_per_day(&eligible);
            let mut by_game_day: HashMap<(&str, NaiveDate), Vec<&ScoreRecord>> = HashMap::new();
            for &record in &best {
                by_game_day
                    .entry((record.game_id.as_str(), record.submitted_at.date_naive()))
                    .or_default()
                    .push(record);
            }
            for (_, mut group) in by_game_day {
                group.sort_by_key(|r| Reverse(r.normalized_score));
                let mut rank = 1;
                for (i, &record) in group.iter().enumerate() {
                    if i > 0 && record.normalized_score != group[i - 1].normalized_score {
                        rank = i as u64 + 1;
                    }
                    let acc = accumulator(&mut players, record);
                    acc.rank_points += rank;
                    acc.total_score += u64::from(record.normalized_score);
                    acc.games.insert(record.game_id.clone());
                }
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = players
        .into_iter()
        .map(|(player_id, acc)| LeaderboardEntry {
            player_id: player_id.to_string(),
            display_name: acc.display_name,
            total_score: acc.total_score,
            games_played: acc.games.len(),
            rank_points: match kind {
                LeaderboardKind::TotalScore => None,
                LeaderboardKind::RankPoints => Some(acc.rank_points),
            },
        })
        .collect();

    match kind {
        LeaderboardKind::TotalScore => entries.sort_by(compare_total_score),
        LeaderboardKind::RankPoints => entries.sort_by(compare_rank_points),
    }
    entries
}

/// Cuts a global leaderboard down to its top rows.
pub fn truncate_global(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.truncate(GLOBAL_LEADERBOARD_LIMIT);
    entries
}

fn accumulator<'a, 'p>(
    players: &'p mut HashMap<&'a str, Accumulator>,
    record: &'a ScoreRecord,
) -> &'p mut Accumulator {
    players.entry(record.player_id.as_str()).or_insert_with(|| Accumulator {
        display_name: display_name(&record.display_name),
        ..Accumulator::default()
    })
}

fn display_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Keeps the highest-scoring record per (player, game, day); the earliest wins ties.
fn best_per_day<'a>(records: &[&'a ScoreRecord]) -> Vec<&'a ScoreRecord> {
    let mut best: HashMap<(&str, &str, NaiveDate), &ScoreRecord> = HashMap::new();
    for &record in records {
        let key = (
            record.player_id.as_str(),
            record.game_id.as_str(),
            record.submitted_at.date_naive(),
        );
        best.entry(key)
            .and_modify(|current| {
                if record.normalized_score > current.normalized_score
                    || (record.normalized_score == current.normalized_score
                        && record.submitted_at < current.submitted_at)
                {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    best.into_values().collect()
}

fn compare_total_score(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| b.games_played.cmp(&a.games_played))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

fn compare_rank_points(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    // players without a game have no rank and go last
    (a.games_played == 0)
        .cmp(&(b.games_played == 0))
        .then_with(|| a.rank_points.cmp(&b.rank_points))
        .then_with(|| b.total_score.cmp(&a.total_score))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, day, hour, 0, 0).unwrap()
    }

    fn record(player: &str, game: &str, score: u8, when: DateTime<Utc>) -> ScoreRecord {
        ScoreRecord {
            player_id: player.into(),
            display_name: player.to_uppercase(),
            game_id: game.into(),
            normalized_score: score,
            submitted_at: when,
        }
    }

    fn member(player: &str) -> Member {
        Member {
            player_id: player.into(),
            display_name: player.to_uppercase(),
        }
    }

    fn ids(entries: &[LeaderboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.player_id.as_str()).collect()
    }

    #[test]
    fn empty_input_is_empty_board() {
        let entries = aggregate(&[], None, Scope::Daily, LeaderboardKind::TotalScore);
        assert!(entries.is_empty());
        let entries = aggregate(&[], None, Scope::Daily, LeaderboardKind::RankPoints);
        assert!(entries.is_empty());
    }

    #[test]
    fn members_without_scores_are_zero_filled() {
        let members = [member("ann"), member("bob"), member("cat")];
        let records = [record("ann", "wordle", 80, at(20, 9))];
        let entries = aggregate(
            &records,
            Some(&members[..]),
            Scope::Daily,
            LeaderboardKind::TotalScore,
        );

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].player_id, "ann");
        for entry in &entries[1..] {
            assert_eq!(entry.total_score, 0);
            assert_eq!(entry.games_played, 0);
        }
        assert_eq!(entries[1].display_name, "BOB");
    }

    #[test]
    fn daily_scope_keeps_best_retry() {
        let records = [
            record("ann", "wordle", 60, at(20, 9)),
            record("ann", "wordle", 85, at(20, 10)),
        ];
        let entries = aggregate(&records, None, Scope::Daily, LeaderboardKind::TotalScore);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_score, 85);
        assert_eq!(entries[0].games_played, 1);
    }

    #[test]
    fn overall_scope_counts_everything() {
        let records = [
            record("ann", "wordle", 60, at(20, 9)),
            record("ann", "wordle", 85, at(20, 10)),
            record("ann", "connections", 100, at(21, 10)),
        ];
        let entries = aggregate(&records, None, Scope::Overall, LeaderboardKind::TotalScore);
        assert_eq!(entries[0].total_score, 245);
        assert_eq!(entries[0].games_played, 2);
    }

    #[test]
    fn totals_sort_descending_and_deterministically() {
        let records = [
            record("a", "wordle", 30, at(20, 9)),
            record("d", "wordle", 90, at(20, 9)),
            record("b", "wordle", 90, at(20, 9)),
            record("c", "wordle", 10, at(20, 9)),
        ];
        let first = aggregate(&records, None, Scope::Daily, LeaderboardKind::TotalScore);
        assert_eq!(ids(&first), ["b", "d", "a", "c"]);

        let mut reversed = records.to_vec();
        reversed.reverse();
        let second = aggregate(&reversed, None, Scope::Daily, LeaderboardKind::TotalScore);
        assert_eq!(first, second);
    }

    #[test]
    fn games_played_breaks_total_ties() {
        let records = [
            record("a", "wordle", 100, at(20, 9)),
            record("b", "wordle", 50, at(20, 9)),
            record("b", "connections", 50, at(20, 9)),
        ];
        let entries = aggregate(&records, None, Scope::Daily, LeaderboardKind::TotalScore);
        assert_eq!(ids(&entries), ["b", "a"]);
    }

    #[test]
    fn non_members_are_ignored_in_groups() {
        let members = [member("ann")];
        let records = [
            record("ann", "wordle", 50, at(20, 9)),
            record("zed", "wordle", 100, at(20, 9)),
        ];
        let entries = aggregate(
            &records,
            Some(&members[..]),
            Scope::Daily,
            LeaderboardKind::TotalScore,
        );
        assert_eq!(ids(&entries), ["ann"]);
    }

    #[test]
    fn blank_display_names_become_anonymous() {
        let mut r = record("ann", "wordle", 50, at(20, 9));
        r.display_name = "  ".into();
        let entries = aggregate(&[r], None, Scope::Daily, LeaderboardKind::TotalScore);
        assert_eq!(entries[0].display_name, ANONYMOUS);
    }

    #[test]
    fn rank_points_use_competition_ranking() {
        let records = [
            record("a", "wordle", 90, at(20, 9)),
            record("b", "wordle", 90, at(20, 9)),
            record("c", "wordle", 50, at(20, 9)),
            record("a", "connections", 40, at(20, 9)),
            record("c", "connections", 100, at(20, 9)),
        ];
        let entries = aggregate(&records, None, Scope::Daily, LeaderboardKind::RankPoints);

        let points: HashMap<&str, u64> = entries
            .iter()
            .map(|e| (e.player_id.as_str(), e.rank_points.unwrap()))
            .collect();
        // wordle: a=1 b=1 c=3; connections: c=1 a=2
        assert_eq!(points["a"], 3);
        assert_eq!(points["b"], 1);
        assert_eq!(points["c"], 4);
        assert_eq!(ids(&entries), ["b", "a", "c"]);
    }

    #[test]
    fn rank_point_ties_prefer_higher_total() {
        let records = [
            record("a", "wordle", 100, at(20, 9)),
            record("b", "connections", 70, at(20, 9)),
        ];
        let entries = aggregate(&records, None, Scope::Daily, LeaderboardKind::RankPoints);
        assert_eq!(ids(&entries), ["a", "b"]);
        assert!(entries.iter().all(|e| e.rank_points == Some(1)));
    }

    #[test]
    fn rank_points_put_idle_members_last() {
        let members = [member("idle"), member("ann"), member("bob")];
        let records = [
            record("ann", "wordle", 50, at(20, 9)),
            record("bob", "wordle", 80, at(20, 9)),
        ];
        let entries = aggregate(
            &records,
            Some(&members[..]),
            Scope::Daily,
            LeaderboardKind::RankPoints,
        );
        assert_eq!(ids(&entries), ["bob", "ann", "idle"]);
        assert_eq!(entries[2].rank_points, Some(0));
    }

    #[test]
    fn rank_points_dedup_retries() {
        let records = [
            record("a", "wordle", 20, at(20, 9)),
            record("a", "wordle", 95, at(20, 11)),
            record("b", "wordle", 90, at(20, 9)),
        ];
        let entries = aggregate(&records, None, Scope::Daily, LeaderboardKind::RankPoints);
        assert_eq!(ids(&entries), ["a", "b"]);
        assert_eq!(entries[0].total_score, 95);
        assert_eq!(entries[1].rank_points, Some(2));
    }

    #[test]
    fn global_board_is_truncated() {
        let records: Vec<ScoreRecord> = (0..30)
            .map(|i| record(&format!("p{:02}", i), "wordle", i as u8, at(20, 9)))
            .collect();
        let entries = truncate_global(aggregate(
            &records,
            None,
            Scope::Daily,
            LeaderboardKind::TotalScore,
        ));
        assert_eq!(entries.len(), GLOBAL_LEADERBOARD_LIMIT);
        assert_eq!(entries[0].player_id, "p29");
    }
}
