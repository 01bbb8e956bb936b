use crate::db::Db;
use crate::error::AppError;
use crate::models::leaderboard::*;
use crate::scoring::leaderboard::{
    aggregate, truncate_global, LeaderboardKind, Member, Scope, ScoreRecord,
};
use crate::services::groups::{is_member, load_members};
use chrono::{DateTime, Days, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// `[start, end)` of a UTC calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let end = date
        .checked_add_days(Days::new(1))
        .unwrap_or(date)
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    (start, end)
}

fn resolve(query: &LeaderboardQuery) -> (LeaderboardKind, Scope, Option<NaiveDate>) {
    let kind = query.kind.unwrap_or_default();
    let scope = query.scope.unwrap_or_default();
    let date = match scope {
        Scope::Daily => Some(query.date.unwrap_or_else(|| Utc::now().date_naive())),
        Scope::Overall => None,
    };
    (kind, scope, date)
}

fn load_records(
    conn: &Connection,
    group_id: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<Vec<ScoreRecord>, rusqlite::Error> {
    let (start, end) = match date {
        Some(date) => {
            let (start, end) = day_bounds(date);
            (Some(start), Some(end))
        }
        None => (None, None),
    };
    let mut stmt = conn.prepare(
        "SELECT user_id, display_name, game_id, score, played_at FROM gameplays
         WHERE ((?1 IS NULL AND group_id IS NULL) OR group_id = ?1)
           AND (?2 IS NULL OR played_at >= ?2)
           AND (?3 IS NULL OR played_at < ?3)
         ORDER BY played_at",
    )?;
    let rows = stmt.query_map(params![group_id, start, end], |row| {
        Ok(ScoreRecord {
            player_id: row.get(0)?,
            display_name: row.get(1)?,
            game_id: row.get(2)?,
            normalized_score: row.get(3)?,
            submitted_at: row.get(4)?,
        })
    })?;
    rows.collect()
}

/// Leaderboard of one group, with a row for every current member. Private
/// groups are only visible to their members.
pub fn group_leaderboard(
    db: &Db,
    viewer: &str,
    group_id: &str,
    query: LeaderboardQuery,
) -> Result<Leaderboard, AppError> {
    let (kind, scope, date) = resolve(&query);

    let (records, members) = db.with_conn(|conn| {
        let is_public: Option<bool> = conn
            .query_row(
                "SELECT is_public FROM groups WHERE id = ?1",
                params![group_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(is_public) = is_public else {
            return Ok(None);
        };
        if !is_public && !is_member(conn, group_id, viewer)? {
            return Ok(Some(None));
        }
        let members: Vec<Member> = load_members(conn, group_id)?
            .into_iter()
            .map(|m| Member {
                player_id: m.user_id,
                display_name: m.display_name,
            })
            .collect();
        Ok(Some(Some((load_records(conn, Some(group_id), date)?, members))))
    })?
    .ok_or_else(|| AppError::NotFound("Group not found".into()))?
    .ok_or_else(|| AppError::Forbidden("This group is private.".into()))?;

    Ok(Leaderboard {
        kind,
        scope,
        date,
        entries: aggregate(&records, Some(members.as_slice()), scope, kind),
    })
}

/// Leaderboard over scores submitted outside any group, top rows only.
pub fn global_leaderboard(db: &Db, query: LeaderboardQuery) -> Result<Leaderboard, AppError> {
    let (kind, scope, date) = resolve(&query);
    let records = db.with_conn(|conn| load_records(conn, None, date))?;
    Ok(Leaderboard {
        kind,
        scope,
        date,
        entries: truncate_global(aggregate(&records, None, scope, kind)),
    })
}
