use crate::db::Db;
use crate::error::AppError;
use crate::identity::Identity;
use crate::models::users::*;
use crate::scoring::rank::rank_for_score;
use crate::services::is_constraint_violation;
use crate::validation;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

fn normalized_email(identity: &Identity) -> Option<String> {
    identity
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

fn email_taken(conn: &Connection, email: &str, user_id: &str) -> Result<bool, rusqlite::Error> {
    let owner: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM users WHERE email = ?1 AND id <> ?2",
            params![email, user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(owner.is_some())
}

/// Creates the user row on first sight. An existing row keeps its display
/// name (owned by the settings page) and only picks up a new e-mail or photo.
/// An e-mail already registered to another account is left out.
pub(crate) fn upsert_user(conn: &Connection, identity: &Identity) -> Result<(), rusqlite::Error> {
    let display_name = validation::validate_display_name(identity.display_name.as_deref());
    let mut email = normalized_email(identity);
    if let Some(taken) = email.as_deref() {
        if email_taken(conn, taken, &identity.user_id)? {
            log::warn!("{} forwarded an e-mail owned by another account", identity.user_id);
            email = None;
        }
    }
    conn.execute(
        "INSERT INTO users (id, display_name, email, photo_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
             email = COALESCE(excluded.email, users.email),
             photo_url = COALESCE(excluded.photo_url, users.photo_url)",
        params![identity.user_id, display_name, email, identity.photo_url, Utc::now()],
    )?;
    Ok(())
}

/// Sign-in entry point. Unlike the implicit upserts done while playing, a
/// clash on e-mail is reported to the caller here.
pub fn upsert_profile(db: &Db, identity: &Identity) -> Result<UserSummary, AppError> {
    let taken_message = "That email address belongs to another account.";
    db.transaction(|tx| {
        if let Some(email) = normalized_email(identity) {
            if email_taken(tx, &email, &identity.user_id)? {
                return Err(AppError::BadRequest(taken_message.into()));
            }
        }
        upsert_user(tx, identity).map_err(|e| {
            if is_constraint_violation(&e) {
                AppError::BadRequest(taken_message.into())
            } else {
                AppError::from(e)
            }
        })
    })?;
    get_profile(db, &identity.user_id)
}

pub(crate) fn load_profile(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<UserProfile>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, display_name, email, photo_url, total_score, created_at
         FROM users WHERE id = ?1",
        params![user_id],
        |row| {
            Ok(UserProfile {
                id: row.get(0)?,
                display_name: row.get(1)?,
                email: row.get(2)?,
                photo_url: row.get(3)?,
                total_score: row.get::<_, i64>(4)?.max(0) as u64,
                created_at: row.get(5)?,
            })
        },
    )
    .optional()
}

pub fn get_profile(db: &Db, user_id: &str) -> Result<UserSummary, AppError> {
    let profile = db
        .with_conn(|conn| load_profile(conn, user_id))?
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))?;
    let rank = rank_for_score(profile.total_score);
    Ok(UserSummary { profile, rank })
}

/// Renames the user everywhere a copy of the name is kept for display.
/// Past gameplays keep the name they were submitted under.
pub fn update_display_name(
    db: &Db,
    user_id: &str,
    req: UpdateProfileRequest,
) -> Result<UserSummary, AppError> {
    let name = req.display_name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Display name cannot be empty.".into()));
    }
    let name = validation::validate_display_name(Some(name));

    db.transaction(|tx| {
        let updated = tx.execute(
            "UPDATE users SET display_name = ?1 WHERE id = ?2",
            params![name, user_id],
        )?;
        if updated == 0 {
            return Err(AppError::NotFound("User profile not found".into()));
        }
        tx.execute(
            "UPDATE group_members SET display_name = ?1 WHERE user_id = ?2",
            params![name, user_id],
        )?;
        tx.execute(
            "UPDATE groups SET creator_name = ?1 WHERE creator_id = ?2",
            params![name, user_id],
        )?;
        Ok(())
    })?;
    get_profile(db, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> Identity {
        Identity {
            user_id: "u-ann".into(),
            display_name: Some("Ann".into()),
            email: Some("Ann@Example.com".into()),
            photo_url: None,
        }
    }

    #[test]
    fn first_sign_in_creates_newbie() {
        let db = Db::open_in_memory().unwrap();
        let summary = upsert_profile(&db, &ann()).unwrap();
        assert_eq!(summary.profile.display_name, "Ann");
        assert_eq!(summary.profile.email.as_deref(), Some("ann@example.com"));
        assert_eq!(summary.profile.total_score, 0);
        assert_eq!(summary.rank.current_rank.name, "Newbie");
    }

    #[test]
    fn sign_in_keeps_chosen_name() {
        let db = Db::open_in_memory().unwrap();
        upsert_profile(&db, &ann()).unwrap();
        let rename = UpdateProfileRequest {
            display_name: "Puzzler".into(),
        };
        update_display_name(&db, "u-ann", rename).unwrap();

        let mut again = ann();
        again.photo_url = Some("https://img.example/ann.png".into());
        let summary = upsert_profile(&db, &again).unwrap();
        assert_eq!(summary.profile.display_name, "Puzzler");
        assert_eq!(
            summary.profile.photo_url.as_deref(),
            Some("https://img.example/ann.png")
        );
    }

    #[test]
    fn email_taken_by_another_account() {
        let db = Db::open_in_memory().unwrap();
        upsert_profile(&db, &ann()).unwrap();
        let mut other = ann();
        other.user_id = "u-other".into();
        let err = upsert_profile(&db, &other).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn implicit_upsert_skips_taken_email() {
        let db = Db::open_in_memory().unwrap();
        upsert_profile(&db, &ann()).unwrap();
        let mut other = ann();
        other.user_id = "u-other".into();
        db.with_conn(|conn| upsert_user(conn, &other)).unwrap();

        let profile = get_profile(&db, "u-other").unwrap();
        assert_eq!(profile.profile.email, None);
        let owner = get_profile(&db, "u-ann").unwrap();
        assert_eq!(owner.profile.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn unknown_profile_is_not_found() {
        let db = Db::open_in_memory().unwrap();
        assert!(matches!(get_profile(&db, "nobody"), Err(AppError::NotFound(_))));
        let rename = UpdateProfileRequest {
            display_name: "X".into(),
        };
        let err = update_display_name(&db, "nobody", rename).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn blank_name_rejected() {
        let db = Db::open_in_memory().unwrap();
        upsert_profile(&db, &ann()).unwrap();
        let rename = UpdateProfileRequest {
            display_name: "  ".into(),
        };
        let err = update_display_name(&db, "u-ann", rename).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
