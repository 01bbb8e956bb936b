use crate::db::Db;
use crate::error::AppError;
use crate::models::friends::*;
use crate::validation;
use rusqlite::{params, OptionalExtension};

/// Befriends the user registered under `req.email`. Friendship is mutual, so
/// both directions are written together.
pub fn add_friend_by_email(
    db: &Db,
    user_id: &str,
    req: AddFriendRequest,
) -> Result<AddFriendResult, AppError> {
    let email = validation::validate_email(&req.email)?;

    db.transaction(|tx| {
        let friend = tx
            .query_row(
                "SELECT id, display_name FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let (friend_id, friend_name) = friend.ok_or_else(|| {
            AppError::NotFound("No user found with that email address.".into())
        })?;

        if friend_id == user_id {
            return Err(AppError::BadRequest("You cannot add yourself as a friend.".into()));
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO friends (user_id, friend_id) VALUES (?1, ?2)",
            params![user_id, friend_id],
        )?;
        if inserted == 0 {
            return Err(AppError::BadRequest("You are already friends with this user.".into()));
        }
        tx.execute(
            "INSERT OR IGNORE INTO friends (user_id, friend_id) VALUES (?1, ?2)",
            params![friend_id, user_id],
        )?;

        Ok(AddFriendResult {
            message: format!("You are now friends with {}.", friend_name),
            friend_id,
        })
    })
}

pub fn list_friends(db: &Db, user_id: &str) -> Result<Vec<Friend>, AppError> {
    Ok(db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT u.id, u.display_name, u.email, u.photo_url
             FROM friends f JOIN users u ON u.id = f.friend_id
             WHERE f.user_id = ?1
             ORDER BY u.display_name COLLATE NOCASE, u.id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Friend {
                id: row.get(0)?,
                display_name: row.get(1)?,
                email: row.get(2)?,
                photo_url: row.get(3)?,
            })
        })?;
        rows.collect()
    })?)
}
