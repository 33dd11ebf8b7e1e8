use crate::utils::serde_helpers::thing_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub profile_img: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub total_posts: i64,
    #[serde(default)]
    pub total_reads: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(with = "thing_id")]
    pub id: String,
    pub personal_info: PersonalInfo,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(rename = "isEditor", default)]
    pub is_editor: bool,
    #[serde(default)]
    pub account_info: AccountInfo,
    #[serde(default)]
    pub blogs: Vec<String>,
    #[serde(default)]
    pub liked_blogs: Vec<String>,
    #[serde(default)]
    pub read_later_blogs: Vec<String>,
    #[serde(rename = "joinedAt")]
    pub joined_at: DateTime<Utc>,
}

/// The commenter/author attributes populated into listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreview {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub username: String,
    #[serde(default)]
    pub profile_img: Option<String>,
}

impl From<&User> for UserPreview {
    fn from(user: &User) -> Self {
        Self {
            full_name: user.personal_info.full_name.clone(),
            username: user.personal_info.username.clone(),
            profile_img: user.personal_info.profile_img.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEditorRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "isEditor")]
    pub is_editor: bool,
}
