use crate::db::Db;
use crate::error::AppError;
use crate::identity::Identity;
use crate::models::groups::*;
use crate::scoring::GameCatalog;
use crate::services::is_constraint_violation;
use crate::services::users::upsert_user;
use crate::validation;
use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

const GENERATED_CODE_ATTEMPTS: usize = 5;

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let chars: Vec<char> = "abcdefghjkmnpqrstuvwxyz23456789".chars().collect();
    (0..8).map(|_| chars[rng.gen_range(0..chars.len())]).collect()
}

fn code_taken(conn: &Connection, code: &str) -> Result<bool, rusqlite::Error> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM groups WHERE join_code = ?1", params![code], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

fn member_display_name(
    conn: &Connection,
    identity: &Identity,
) -> Result<(String, Option<String>), rusqlite::Error> {
    upsert_user(conn, identity)?;
    conn.query_row(
        "SELECT display_name, photo_url FROM users WHERE id = ?1",
        params![identity.user_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}

pub fn create_group(
    db: &Db,
    catalog: &GameCatalog,
    identity: &Identity,
    req: CreateGroupRequest,
) -> Result<CreateGroupResult, AppError> {
    let name = validation::validate_group_name(&req.name)?;
    let game_ids = validation::validate_game_ids(catalog, &req.game_ids)?;
    let requested_code = req
        .join_code
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(validation::validate_join_code)
        .transpose()?;

    let group_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let result = db.transaction(|tx| {
        let join_code = match &requested_code {
            Some(code) => {
                if code_taken(tx, code)? {
                    return Err(AppError::BadRequest(
                        "This join code is already in use. Please choose another.".into(),
                    ));
                }
                code.clone()
            }
            None => {
                let mut generated = None;
                for _ in 0..GENERATED_CODE_ATTEMPTS {
                    let code = generate_code();
                    if !code_taken(tx, &code)? {
                        generated = Some(code);
                        break;
                    }
                }
                generated.ok_or_else(|| {
                    AppError::Internal("could not generate a free join code".into())
                })?
            }
        };

        let (creator_name, photo_url) = member_display_name(tx, identity)?;
        tx.execute(
            "INSERT INTO groups
                 (id, name, join_code, creator_id, creator_name,
                  is_public, member_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
            params![group_id, name, join_code, identity.user_id, creator_name, req.is_public, now],
        )?;
        for game_id in &game_ids {
            tx.execute(
                "INSERT INTO group_games (group_id, game_id) VALUES (?1, ?2)",
                params![group_id, game_id],
            )?;
        }
        tx.execute(
            "INSERT INTO group_members (group_id, user_id, display_name, photo_url, joined_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![group_id, identity.user_id, creator_name, photo_url, now],
        )?;
        Ok(join_code)
    });

    match result {
        Ok(join_code) => {
            log::info!(
                "group {} created by {} with code {}",
                group_id,
                identity.user_id,
                join_code
            );
            Ok(CreateGroupResult { group_id })
        }
        // Lost a race for the same code against another request.
        Err(AppError::Db(e)) if is_constraint_violation(&e) => Err(AppError::BadRequest(
            "This join code is already in use. Please choose another.".into(),
        )),
        Err(e) => Err(e),
    }
}

pub fn join_group(
    db: &Db,
    identity: &Identity,
    req: JoinGroupRequest,
) -> Result<JoinGroupResult, AppError> {
    let code = req.join_code.trim().to_lowercase();
    if code.is_empty() {
        return Err(AppError::BadRequest("Please enter a join code.".into()));
    }

    db.transaction(|tx| {
        let group = tx
            .query_row(
                "SELECT id, name FROM groups WHERE join_code = ?1",
                params![code],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let (group_id, group_name) = group.ok_or_else(|| {
            AppError::NotFound(format!("Could not find a group with code \"{}\".", code))
        })?;

        let (display_name, photo_url) = member_display_name(tx, identity)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO group_members
                 (group_id, user_id, display_name, photo_url, joined_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![group_id, identity.user_id, display_name, photo_url, Utc::now()],
        )?;
        if inserted > 0 {
            tx.execute(
                "UPDATE groups SET member_count = member_count + 1 WHERE id = ?1",
                params![group_id],
            )?;
        }
        Ok(JoinGroupResult {
            group_id,
            group_name,
            already_in_group: inserted == 0,
        })
    })
}

fn creator_of(conn: &Connection, group_id: &str) -> Result<String, AppError> {
    conn.query_row(
        "SELECT creator_id FROM groups WHERE id = ?1",
        params![group_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("Group not found".into()))
}

pub fn leave_group(db: &Db, user_id: &str, group_id: &str) -> Result<MutateGroupResult, AppError> {
    db.transaction(|tx| {
        if creator_of(tx, group_id)? == user_id {
            return Err(AppError::BadRequest(
                "Group creators cannot leave a group. You must delete it instead.".into(),
            ));
        }
        let removed = tx.execute(
            "DELETE FROM group_members WHERE group_id = ?1 AND user_id = ?2",
            params![group_id, user_id],
        )?;
        if removed == 0 {
            return Err(AppError::BadRequest("You are not a member of this group.".into()));
        }
        tx.execute(
            "UPDATE groups SET member_count = member_count - 1 WHERE id = ?1",
            params![group_id],
        )?;
        Ok(MutateGroupResult { success: true })
    })
}

/// Deletes the group with its members and game list. Gameplays submitted to it
/// stay in their players' history.
pub fn delete_group(db: &Db, user_id: &str, group_id: &str) -> Result<MutateGroupResult, AppError> {
    db.transaction(|tx| {
        if creator_of(tx, group_id)? != user_id {
            return Err(AppError::Forbidden("Only the group creator can delete this group.".into()));
        }
        tx.execute("DELETE FROM groups WHERE id = ?1", params![group_id])?;
        log::info!("group {} deleted by {}", group_id, user_id);
        Ok(MutateGroupResult { success: true })
    })
}

const GROUP_COLUMNS: &str = "g.id, g.name, g.join_code, g.creator_id, g.creator_name, \
     g.is_public, g.member_count, g.created_at";

fn group_from_row(row: &rusqlite::Row<'_>) -> Result<Group, rusqlite::Error> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        join_code: row.get(2)?,
        creator_id: row.get(3)?,
        creator_name: row.get(4)?,
        is_public: row.get(5)?,
        member_count: row.get(6)?,
        game_ids: Vec::new(),
        created_at: row.get(7)?,
    })
}

fn load_game_ids(conn: &Connection, group: &mut Group) -> Result<(), rusqlite::Error> {
    let mut stmt =
        conn.prepare("SELECT game_id FROM group_games WHERE group_id = ?1 ORDER BY rowid")?;
    let ids = stmt.query_map(params![group.id], |row| row.get(0))?;
    group.game_ids = ids.collect::<Result<_, _>>()?;
    Ok(())
}

fn query_groups(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Group>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let mut groups = stmt
        .query_map(params, group_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    for group in &mut groups {
        load_game_ids(conn, group)?;
    }
    Ok(groups)
}

pub(crate) fn load_members(
    conn: &Connection,
    group_id: &str,
) -> Result<Vec<GroupMember>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT user_id, display_name, photo_url FROM group_members
         WHERE group_id = ?1 ORDER BY joined_at, rowid",
    )?;
    let members = stmt.query_map(params![group_id], |row| {
        Ok(GroupMember {
            user_id: row.get(0)?,
            display_name: row.get(1)?,
            photo_url: row.get(2)?,
        })
    })?;
    members.collect()
}

/// Public groups are visible to anyone; private ones only to their members.
pub fn get_group(db: &Db, viewer: Option<&str>, group_id: &str) -> Result<GroupDetail, AppError> {
    db.with_conn(|conn| {
        let sql = format!("SELECT {} FROM groups g WHERE g.id = ?1", GROUP_COLUMNS);
        let group = query_groups(conn, &sql, &[&group_id])?.pop();
        let members = match &group {
            Some(_) => load_members(conn, group_id)?,
            None => Vec::new(),
        };
        Ok((group, members))
    })
    .map_err(AppError::from)
    .and_then(|(group, members)| {
        let group = group.ok_or_else(|| AppError::NotFound("Group not found".into()))?;
        let is_member = viewer.is_some_and(|v| members.iter().any(|m| m.user_id == v));
        if !group.is_public && !is_member {
            return Err(AppError::Forbidden("This group is private.".into()));
        }
        Ok(GroupDetail { group, members })
    })
}

pub(crate) fn is_member(
    conn: &Connection,
    group_id: &str,
    user_id: &str,
) -> Result<bool, rusqlite::Error> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM group_members WHERE group_id = ?1 AND user_id = ?2",
            params![group_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Groups the user belongs to, most recently joined first.
pub fn my_groups(db: &Db, user_id: &str) -> Result<Vec<Group>, AppError> {
    let sql = format!(
        "SELECT {} FROM groups g
         JOIN group_members m ON m.group_id = g.id
         WHERE m.user_id = ?1
         ORDER BY m.joined_at DESC, m.rowid DESC",
        GROUP_COLUMNS
    );
    Ok(db.with_conn(|conn| query_groups(conn, &sql, &[&user_id]))?)
}

pub fn public_groups(db: &Db, query: PublicGroupsQuery) -> Result<Vec<Group>, AppError> {
    let search = validation::validate_search_term(query.search.as_deref());
    let order = match query.sort.unwrap_or_default() {
        GroupSort::Newest => "g.created_at DESC, g.rowid DESC",
        GroupSort::Members => "g.member_count DESC, g.created_at DESC",
    };

    Ok(db.with_conn(|conn| match &search {
        Some(term) => {
            let sql = format!(
                "SELECT {} FROM groups g
                 WHERE g.is_public = 1 AND instr(lower(g.name), ?1) > 0
                 ORDER BY {}",
                GROUP_COLUMNS, order
            );
            query_groups(conn, &sql, &[term])
        }
        None => {
            let sql = format!(
                "SELECT {} FROM groups g WHERE g.is_public = 1 ORDER BY {}",
                GROUP_COLUMNS, order
            );
            query_groups(conn, &sql, &[])
        }
    })?)
}
