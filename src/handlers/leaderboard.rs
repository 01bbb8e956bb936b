use crate::error::AppError;
use crate::identity;
use crate::models::leaderboard::*;
use crate::services::leaderboard as service;
use crate::state::AppState;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

pub async fn global_leaderboard(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let board = service::global_leaderboard(&state.db, query.into_inner())?;
    Ok(HttpResponse::Ok().json(&board))
}

pub async fn group_leaderboard(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    path: web::types::Path<String>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let group_id = path.into_inner();
    let board =
        service::group_leaderboard(&state.db, &identity.user_id, &group_id, query.into_inner())?;
    Ok(HttpResponse::Ok().json(&board))
}
