use crate::error::AppError;
use crate::identity;
use crate::models::feedback::*;
use crate::services::feedback as service;
use crate::state::AppState;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

pub async fn submit_feedback(
    state: web::types::State<Arc<AppState>>,
    req: HttpRequest,
    body: web::types::Json<FeedbackRequest>,
) -> Result<HttpResponse, AppError> {
    let sender = identity::optional(&req);
    let result = service::submit_feedback(
        &state.db,
        sender.as_ref().map(|s| s.user_id.as_str()),
        body.into_inner(),
    )?;
    Ok(HttpResponse::Created().json(&result))
}
