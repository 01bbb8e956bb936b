use crate::db::Db;
use crate::error::AppError;
use crate::models::feedback::*;
use crate::validation;
use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

/// Stores a suggestion or bug report. Signed-out visitors may send feedback too.
pub fn submit_feedback(
    db: &Db,
    user_id: Option<&str>,
    req: FeedbackRequest,
) -> Result<FeedbackResult, AppError> {
    let kind = req.kind.trim().to_lowercase();
    validation::validate_feedback_kind(&kind)?;
    validation::validate_feedback_text(&req.subject, &req.description)?;

    let id = Uuid::new_v4().to_string();
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO feedback (id, kind, subject, description, user_id, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, kind, req.subject.trim(), req.description.trim(), user_id, Utc::now()],
        )
    })?;
    log::info!("{} feedback {} received", kind, id);

    Ok(FeedbackResult { id, accepted: true })
}
