use crate::error::AppError;
use crate::identity;
use crate::models::groups::*;
use crate::services::groups as service;
use crate::state::AppState;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

pub async fn create_group(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    body: web::types::Json<CreateGroupRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let result = service::create_group(&state.db, &state.catalog, &identity, body.into_inner())?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn join_group(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    body: web::types::Json<JoinGroupRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let result = service::join_group(&state.db, &identity, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn leave_group(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let result = service::leave_group(&state.db, &identity.user_id, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn delete_group(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let result = service::delete_group(&state.db, &identity.user_id, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn get_group(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let viewer = identity::optional(&req);
    let detail = service::get_group(
        &state.db,
        viewer.as_ref().map(|v| v.user_id.as_str()),
        &path.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(&detail))
}

pub async fn my_groups(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let groups = service::my_groups(&state.db, &identity.user_id)?;
    Ok(HttpResponse::Ok().json(&groups))
}

pub async fn public_groups(
    state: web::types::State<Arc<AppState>>,
    query: web::types::Query<PublicGroupsQuery>,
) -> Result<HttpResponse, AppError> {
    let groups = service::public_groups(&state.db, query.into_inner())?;
    Ok(HttpResponse::Ok().json(&groups))
}
