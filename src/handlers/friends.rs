use crate::error::AppError;
use crate::identity;
use crate::models::friends::*;
use crate::services::friends as service;
use crate::state::AppState;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

pub async fn list_friends(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let friends = service::list_friends(&state.db, &identity.user_id)?;
    Ok(HttpResponse::Ok().json(&friends))
}

pub async fn add_friend(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    body: web::types::Json<AddFriendRequest>,
) -> Result<HttpResponse, AppError> {
    let identity = identity::authenticated(&req)?;
    let result = service::add_friend_by_email(&state.db, &identity.user_id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&result))
}
