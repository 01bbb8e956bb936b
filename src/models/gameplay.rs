use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ScoreSubmission {
    pub game_id: String,
    pub group_id: Option<String>,
    /// Pasted share text or a typed number; never persisted.
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreSubmissionResult {
    pub id: String,
    pub game_id: String,
    pub raw_score: f64,
    pub normalized_score: u8,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Gameplay {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub game_id: String,
    pub group_id: Option<String>,
    pub raw_score: f64,
    pub score: u8,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ScorePoint {
    pub played_at: DateTime<Utc>,
    pub score: u8,
}

#[derive(Debug, Serialize)]
pub struct GameAnalytics {
    pub game_id: String,
    pub game_name: String,
    pub plays: usize,
    pub average_score: f64,
    pub best_score: u8,
    pub latest_score: u8,
    pub history: Vec<ScorePoint>,
}
