use crate::error::AppError;
use crate::scoring::GameCatalog;

const MAX_DISPLAY_NAME_LEN: usize = 32;
const MAX_GROUP_NAME_LEN: usize = 50;
const MIN_GROUP_NAME_LEN: usize = 3;
const MIN_JOIN_CODE_LEN: usize = 4;
const MAX_JOIN_CODE_LEN: usize = 20;
const MAX_SHARE_TEXT_LEN: usize = 4 * 1024;
const MAX_FEEDBACK_SUBJECT_LEN: usize = 120;
const MAX_FEEDBACK_DESCRIPTION_LEN: usize = 4_000;
const MAX_SEARCH_TERM_LEN: usize = 64;
const MAX_GROUP_GAMES: usize = 20;
const VALID_FEEDBACK_KINDS: &[&str] = &["suggestion", "bug"];

pub fn validate_display_name(name: Option<&str>) -> String {
    let trimmed = name.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        "Anonymous".to_string()
    } else {
        trimmed.chars().take(MAX_DISPLAY_NAME_LEN).collect()
    }
}

pub fn validate_group_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len < MIN_GROUP_NAME_LEN || len > MAX_GROUP_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Group name must be {}-{} characters",
            MIN_GROUP_NAME_LEN, MAX_GROUP_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Join codes are case-insensitive and stored lower-cased.
pub fn validate_join_code(code: &str) -> Result<String, AppError> {
    let code = code.trim().to_lowercase();
    let len = code.chars().count();
    if len < MIN_JOIN_CODE_LEN || len > MAX_JOIN_CODE_LEN {
        return Err(AppError::BadRequest(format!(
            "Join code must be {}-{} characters",
            MIN_JOIN_CODE_LEN, MAX_JOIN_CODE_LEN
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(AppError::BadRequest(
            "Join code may only contain letters, numbers and dashes".into(),
        ));
    }
    Ok(code)
}

pub fn validate_game_ids(
    catalog: &GameCatalog,
    game_ids: &[String],
) -> Result<Vec<String>, AppError> {
    if game_ids.is_empty() {
        return Err(AppError::BadRequest("Select at least one game".into()));
    }
    if game_ids.len() > MAX_GROUP_GAMES {
        return Err(AppError::BadRequest(format!(
            "You can select up to {} games",
            MAX_GROUP_GAMES
        )));
    }
    let mut unique: Vec<String> = Vec::with_capacity(game_ids.len());
    for id in game_ids {
        validate_game_id(catalog, id)?;
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    Ok(unique)
}

pub fn validate_game_id(catalog: &GameCatalog, game_id: &str) -> Result<(), AppError> {
    if catalog.contains(game_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Unknown game: {}", game_id)))
    }
}

pub fn validate_share_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        Err(AppError::BadRequest("Please enter or paste your score.".into()))
    } else if text.len() > MAX_SHARE_TEXT_LEN {
        Err(AppError::BadRequest("Pasted text is too long".into()))
    } else {
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AppError::BadRequest(format!("Invalid email address: {}", email)))
    }
}

pub fn validate_feedback_kind(kind: &str) -> Result<(), AppError> {
    if VALID_FEEDBACK_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid feedback type: {}", kind)))
    }
}

pub fn validate_feedback_text(subject: &str, description: &str) -> Result<(), AppError> {
    let subject_len = subject.trim().chars().count();
    if subject_len == 0 || subject_len > MAX_FEEDBACK_SUBJECT_LEN {
        return Err(AppError::BadRequest(format!(
            "Subject must be 1-{} characters",
            MAX_FEEDBACK_SUBJECT_LEN
        )));
    }
    let description_len = description.trim().chars().count();
    if description_len < 10 || description_len > MAX_FEEDBACK_DESCRIPTION_LEN {
        return Err(AppError::BadRequest(format!(
            "Description must be 10-{} characters",
            MAX_FEEDBACK_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

pub fn validate_search_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.chars().take(MAX_SEARCH_TERM_LEN).collect::<String>().to_lowercase())
}
