use crate::db::Db;
use crate::error::AppError;
use crate::identity::Identity;
use crate::models::gameplay::*;
use crate::scoring::{normalize_score, parse_raw_score, GameCatalog, ParseFailure};
use crate::services::users::upsert_user;
use crate::validation;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;
use uuid::Uuid;

pub fn submit_score(
    db: &Db,
    catalog: &GameCatalog,
    identity: &Identity,
    req: ScoreSubmission,
) -> Result<ScoreSubmissionResult, AppError> {
    validation::validate_game_id(catalog, &req.game_id)?;
    validation::validate_share_text(&req.text)?;

    let game = catalog
        .get(&req.game_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown game: {}", req.game_id)))?;

    let raw_score = parse_raw_score(catalog, &req.game_id, &req.text).map_err(|failure| {
        log::debug!("rejected {} submission: {}", req.game_id, failure);
        match failure {
            ParseFailure::UnknownGame(id) => AppError::BadRequest(format!("Unknown game: {}", id)),
            _ => AppError::InvalidScore {
                game: game.name.clone(),
                expected: game.expected_format(),
            },
        }
    })?;
    let score = normalize_score(catalog, &req.game_id, raw_score)?;

    let id = Uuid::new_v4().to_string();
    let played_at = Utc::now();
    let group_id = req.group_id.as_deref().map(str::trim).filter(|g| !g.is_empty());

    db.transaction(|tx| {
        if let Some(group_id) = group_id {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM groups WHERE id = ?1",
                    params![group_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(AppError::NotFound("Group not found".into()));
            }
            let member: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM group_members WHERE group_id = ?1 AND user_id = ?2",
                    params![group_id, identity.user_id],
                    |row| row.get(0),
                )
                .optional()?;
            if member.is_none() {
                return Err(AppError::Forbidden("You are not a member of this group.".into()));
            }
            let tracked: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM group_games WHERE group_id = ?1 AND game_id = ?2",
                    params![group_id, req.game_id],
                    |row| row.get(0),
                )
                .optional()?;
            if tracked.is_none() {
                return Err(AppError::BadRequest(format!(
                    "{} is not one of this group's games",
                    game.name
                )));
            }
        }

        upsert_user(tx, identity)?;
        let display_name: String = tx.query_row(
            "SELECT display_name FROM users WHERE id = ?1",
            params![identity.user_id],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO gameplays
                 (id, user_id, display_name, game_id, group_id, raw_score, score, played_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                identity.user_id,
                display_name,
                req.game_id,
                group_id,
                raw_score,
                score,
                played_at
            ],
        )?;
        tx.execute(
            "UPDATE users SET total_score = total_score + ?1 WHERE id = ?2",
            params![score, identity.user_id],
        )?;
        Ok(())
    })?;

    log::info!(
        "{} scored {} on {} (raw {})",
        identity.user_id,
        score,
        req.game_id,
        raw_score
    );

    Ok(ScoreSubmissionResult {
        id,
        game_id: req.game_id,
        raw_score,
        normalized_score: score,
        played_at,
    })
}

/// Every gameplay of one user, oldest first.
pub fn user_gameplays(db: &Db, user_id: &str) -> Result<Vec<Gameplay>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, display_name, game_id, group_id, raw_score, score, played_at
             FROM gameplays WHERE user_id = ?1 ORDER BY played_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Gameplay {
                id: row.get(0)?,
                user_id: row.get(1)?,
                display_name: row.get(2)?,
                game_id: row.get(3)?,
                group_id: row.get(4)?,
                raw_score: row.get(5)?,
                score: row.get(6)?,
                played_at: row.get(7)?,
            })
        })?;
        rows.collect()
    })?)
}

pub fn user_analytics(
    db: &Db,
    catalog: &GameCatalog,
    user_id: &str,
) -> Result<Vec<GameAnalytics>, AppError> {
    let gameplays = user_gameplays(db, user_id)?;

    let mut by_game: HashMap<&str, Vec<&Gameplay>> = HashMap::new();
    for gameplay in &gameplays {
        by_game.entry(gameplay.game_id.as_str()).or_default().push(gameplay);
    }

    let mut analytics: Vec<GameAnalytics> = by_game
        .into_iter()
        .filter_map(|(game_id, plays)| {
            let latest = plays.last()?;
            let sum: u64 = plays.iter().map(|p| u64::from(p.score)).sum();
            let average = sum as f64 / plays.len() as f64;
            Some(GameAnalytics {
                game_id: game_id.to_string(),
                game_name: catalog
                    .get(game_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| game_id.to_string()),
                plays: plays.len(),
                average_score: (average * 10.0).round() / 10.0,
                best_score: plays.iter().map(|p| p.score).max().unwrap_or_default(),
                latest_score: latest.score,
                history: plays
                    .iter()
                    .map(|p| ScorePoint {
                        played_at: p.played_at,
                        score: p.score,
                    })
                    .collect(),
            })
        })
        .collect();

    analytics.sort_by(|a, b| b.plays.cmp(&a.plays).then_with(|| a.game_id.cmp(&b.game_id)));
    Ok(analytics)
}
