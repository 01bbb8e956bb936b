use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub game_ids: Vec<String>,
    /// Generated when left out.
    pub join_code: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateGroupResult {
    pub group_id: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinGroupRequest {
    pub join_code: String,
}

#[derive(Debug, Serialize)]
pub struct JoinGroupResult {
    pub group_id: String,
    pub group_name: String,
    pub already_in_group: bool,
}

#[derive(Debug, Serialize)]
pub struct MutateGroupResult {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    pub user_id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub join_code: String,
    pub creator_id: String,
    pub creator_name: String,
    pub is_public: bool,
    pub member_count: i64,
    pub game_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSort {
    Newest,
    #[default]
    Members,
}

#[derive(Debug, Deserialize)]
pub struct PublicGroupsQuery {
    pub search: Option<String>,
    pub sort: Option<GroupSort>,
}
