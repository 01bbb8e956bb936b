use crate::error::AppError;
use crate::identity;
use crate::models::gameplay::*;
use crate::services::gameplay as service;
use crate::state::AppState;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

pub async fn submit_score(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    body: web::types::Json<ScoreSubmission>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let result = service::submit_score(&state.db, &state.catalog, &identity, body.into_inner())?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn my_scores(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let gameplays = service::user_gameplays(&state.db, &identity.user_id)?;
    Ok(HttpResponse::Ok().json(&gameplays))
}

pub async fn my_analytics(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let analytics = service::user_analytics(&state.db, &state.catalog, &identity.user_id)?;
    Ok(HttpResponse::Ok().json(&analytics))
}
