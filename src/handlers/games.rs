use crate::error::AppError;
use crate::models::games::*;
use crate::services::games as service;
use crate::state::AppState;
use chrono::Utc;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn list_games(state: web::types::State<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(&service::list_games(&state.catalog))
}

pub async fn featured_game(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<FeaturedQuery>,
) -> Result<HttpResponse, AppError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let featured = service::game_of_the_day(&state.catalog, date)?;
    Ok(HttpResponse::Ok().json(&featured))
}
