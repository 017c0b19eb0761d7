use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::upstream::{RawComment, RawPost, RawUser};

// ==================== Общий контракт списков ====================

/// One page of normalized records, the shape every list screen renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: Option<u64>,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// More pages may exist iff the page came back full.
    pub fn is_full(&self) -> bool {
        self.data.len() as u32 == self.limit
    }
}

/// Unpaginated list wrapper, used where upstream returns everything at
/// once (tag list, per-post comments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
}

pub type TagList = Listing<String>;

// ==================== Модели постов ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub text: String,
    pub image: String,
    pub likes: u64,
    pub tags: Vec<String>,
    pub publish_date: DateTime<Utc>,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub picture: String,
    pub title: Option<String>,
}

impl Post {
    /// Upstream posts carry no image, no date and no author name, so those
    /// fields are synthesized here. The image and avatar URLs are keyed by
    /// id and must stay byte-stable across calls; the publish date is the
    /// mapping time and is NOT stable across re-fetches.
    pub fn from_raw(raw: RawPost) -> Self {
        Self {
            id: raw.id,
            text: raw.body,
            image: post_image_url(raw.id),
            likes: raw.reactions.likes(),
            tags: raw.tags,
            publish_date: Utc::now(),
            owner: Owner {
                id: raw.user_id,
                first_name: "User".to_string(),
                last_name: raw.user_id.to_string(),
                picture: avatar_url(raw.user_id),
                title: Some(raw.title),
            },
        }
    }
}

// ==================== Модели комментариев ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub message: String,
    pub publish_date: DateTime<Utc>,
    pub owner: Owner,
}

impl Comment {
    pub fn from_raw(raw: RawComment) -> Self {
        let (first_name, last_name) = split_username(&raw.user.username, raw.user.id);
        Self {
            id: raw.id,
            message: raw.body,
            publish_date: Utc::now(),
            owner: Owner {
                id: raw.user.id,
                first_name,
                last_name,
                picture: avatar_url(raw.user.id),
                title: None,
            },
        }
    }
}

// ==================== Модели пользователей ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture: String,
    pub title: String,
}

impl User {
    pub fn from_raw(raw: RawUser) -> Self {
        let title = resolve_title(
            raw.company.as_ref().and_then(|c| c.title.as_deref()),
            raw.role.as_deref(),
        );
        Self {
            id: raw.id,
            first_name: raw.first_name,
            last_name: raw.last_name,
            email: raw.email,
            picture: raw.image,
            title,
        }
    }
}

// ==================== Синтез полей ====================

/// Deterministic placeholder image: same post id, same URL, always.
pub fn post_image_url(post_id: u64) -> String {
    format!("https://picsum.photos/seed/{}/800/600", post_id)
}

/// Deterministic avatar keyed by user id.
pub fn avatar_url(user_id: u64) -> String {
    format!("https://i.pravatar.cc/150?u={}", user_id)
}

/// Split a "jane.doe"-style username on its first dot. A username without
/// a separator keeps itself as the first name and falls back to the raw
/// user id for the last name; empty components fall back the same way.
pub fn split_username(username: &str, user_id: u64) -> (String, String) {
    match username.split_once('.') {
        Some((first, last)) => {
            let first = if first.is_empty() { "User" } else { first };
            let last = if last.is_empty() {
                user_id.to_string()
            } else {
                last.to_string()
            };
            (first.to_string(), last)
        }
        None => {
            let first = if username.is_empty() { "User" } else { username };
            (first.to_string(), user_id.to_string())
        }
    }
}

/// User title precedence: company title, then role, then plain "User".
pub fn resolve_title(company_title: Option<&str>, role: Option<&str>) -> String {
    company_title
        .filter(|t| !t.is_empty())
        .or(role.filter(|r| !r.is_empty()))
        .unwrap_or("User")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::Reactions;

    #[test]
    fn image_and_avatar_urls_are_stable_per_id() {
        assert_eq!(post_image_url(7), post_image_url(7));
        assert_eq!(post_image_url(7), "https://picsum.photos/seed/7/800/600");
        assert_eq!(avatar_url(42), avatar_url(42));
        assert_eq!(avatar_url(42), "https://i.pravatar.cc/150?u=42");
    }

    #[test]
    fn username_splits_on_first_dot() {
        assert_eq!(
            split_username("jane.doe", 5),
            ("jane".to_string(), "doe".to_string())
        );
        // only the first dot separates
        assert_eq!(
            split_username("jane.van.doe", 5),
            ("jane".to_string(), "van.doe".to_string())
        );
    }

    #[test]
    fn username_without_separator_falls_back_to_user_id() {
        assert_eq!(
            split_username("jane", 17),
            ("jane".to_string(), "17".to_string())
        );
    }

    #[test]
    fn empty_username_components_fall_back() {
        assert_eq!(
            split_username("", 3),
            ("User".to_string(), "3".to_string())
        );
        assert_eq!(
            split_username("jane.", 3),
            ("jane".to_string(), "3".to_string())
        );
    }

    #[test]
    fn title_prefers_company_then_role_then_default() {
        assert_eq!(resolve_title(Some("Engineer"), Some("admin")), "Engineer");
        assert_eq!(resolve_title(None, Some("admin")), "admin");
        assert_eq!(resolve_title(None, None), "User");
        // an empty company title does not shadow the role
        assert_eq!(resolve_title(Some(""), Some("admin")), "admin");
    }

    #[test]
    fn likes_prefer_nested_reactions() {
        let detailed: Reactions =
            serde_json::from_str(r#"{"likes": 12, "dislikes": 3}"#).unwrap();
        assert_eq!(detailed.likes(), 12);

        let flat: Reactions = serde_json::from_str("27").unwrap();
        assert_eq!(flat.likes(), 27);
    }

    #[test]
    fn post_owner_is_synthesized_from_user_id() {
        let raw: RawPost = serde_json::from_str(
            r#"{
                "id": 9,
                "title": "His mother had always taught him",
                "body": "His mother had always taught him not to ever think of himself as better than others.",
                "userId": 121,
                "tags": ["history", "crime"],
                "reactions": {"likes": 192, "dislikes": 25}
            }"#,
        )
        .unwrap();

        let post = Post::from_raw(raw);
        assert_eq!(post.owner.first_name, "User");
        assert_eq!(post.owner.last_name, "121");
        assert_eq!(post.owner.picture, "https://i.pravatar.cc/150?u=121");
        assert_eq!(
            post.owner.title.as_deref(),
            Some("His mother had always taught him")
        );
        assert_eq!(post.likes, 192);
        assert_eq!(post.image, "https://picsum.photos/seed/9/800/600");
    }
}
