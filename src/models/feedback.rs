use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResult {
    pub id: String,
    pub accepted: bool,
}
