//! Raw DummyJSON response shapes, one type per accepted variant.
//!
//! Every endpoint response is parsed into these DTOs before any field
//! synthesis happens, so a shape change upstream fails loudly at decode
//! time instead of silently producing half-empty view models.

use serde::Deserialize;

// ==================== Посты ====================

#[derive(Debug, Clone, Deserialize)]
pub struct PostsEnvelope {
    pub posts: Vec<RawPost>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub reactions: Reactions,
}

/// Reaction counts vary by upstream API version: newer responses nest
/// `{ likes, dislikes }`, older ones carry a flat number. The nested
/// shape wins when both could apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Reactions {
    Detailed {
        likes: u64,
        #[serde(default)]
        dislikes: u64,
    },
    Flat(u64),
}

impl Reactions {
    pub fn likes(&self) -> u64 {
        match self {
            Reactions::Detailed { likes, .. } => *likes,
            Reactions::Flat(total) => *total,
        }
    }
}

// ==================== Комментарии ====================

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsEnvelope {
    pub comments: Vec<RawComment>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: u64,
    pub body: String,
    #[serde(default)]
    pub post_id: u64,
    pub user: RawCommentUser,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommentUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

// ==================== Пользователи ====================

#[derive(Debug, Clone, Deserialize)]
pub struct UsersEnvelope {
    pub users: Vec<RawUser>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<RawCompany>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCompany {
    #[serde(default)]
    pub title: Option<String>,
}
