//! Identity forwarded by the authenticating proxy in front of the server.

use crate::error::AppError;
use ntex::http::HeaderMap;
use ntex::web::HttpRequest;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_PHOTO_HEADER: &str = "x-user-photo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn new(user_id: &str, display_name: Option<&str>) -> Self {
        Identity {
            user_id: user_id.to_string(),
            display_name: display_name.map(str::to_string),
            email: None,
            photo_url: None,
        }
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn from_headers(headers: &HeaderMap) -> Result<Identity, AppError> {
    let user_id = header(headers, USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Please sign in to continue.".into()))?;
    Ok(Identity {
        user_id,
        display_name: header(headers, USER_NAME_HEADER),
        email: header(headers, USER_EMAIL_HEADER),
        photo_url: header(headers, USER_PHOTO_HEADER),
    })
}

pub fn authenticated(req: &HttpRequest) -> Result<Identity, AppError> {
    from_headers(req.headers())
}

/// Like [`authenticated`] but signed-out callers are allowed.
pub fn optional(req: &HttpRequest) -> Option<Identity> {
    from_headers(req.headers()).ok()
}
