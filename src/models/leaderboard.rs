use crate::scoring::leaderboard::{LeaderboardEntry, LeaderboardKind, Scope};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub kind: Option<LeaderboardKind>,
    pub scope: Option<Scope>,
    /// Day for the daily scope, defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub kind: LeaderboardKind,
    pub scope: Scope,
    pub date: Option<NaiveDate>,
    pub entries: Vec<LeaderboardEntry>,
}
