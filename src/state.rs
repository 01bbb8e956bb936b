use crate::db::Db;
use crate::scoring::GameCatalog;

/// Shared by every request handler.
pub struct AppState {
    pub db: Db,
    pub catalog: GameCatalog,
}
