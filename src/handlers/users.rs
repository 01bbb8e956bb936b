use crate::error::AppError;
use crate::identity;
use crate::models::users::*;
use crate::services::users as service;
use crate::state::AppState;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

/// Called after sign-in to create or refresh the caller's profile.
pub async fn upsert_me(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let summary = service::upsert_profile(&state.db, &identity)?;
    Ok(HttpResponse::Ok().json(&summary))
}

pub async fn get_me(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let summary = service::get_profile(&state.db, &identity.user_id)?;
    Ok(HttpResponse::Ok().json(&summary))
}

pub async fn update_me(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    body: web::types::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let summary = service::update_display_name(&state.db, &identity.user_id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&summary))
}
