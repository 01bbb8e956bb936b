use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AddFriendRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AddFriendResult {
    pub friend_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Friend {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}
