pub mod feedback;
pub mod friends;
pub mod gameplay;
pub mod games;
pub mod groups;
pub mod leaderboard;
pub mod users;

use rusqlite::ErrorCode;

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}
