use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Resource};
use crate::models::{Comment, Listing, Page, Post, TagList, User};
use crate::upstream::{CommentsEnvelope, PostsEnvelope, RawPost, RawUser, UsersEnvelope};

/// Page size every screen requests unless told otherwise.
pub const DEFAULT_LIMIT: u32 = 20;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// Client for the upstream content API. Stateless: every call is a single
/// request/response, no retries, no caching.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET a path and decode the body, tagging any non-2xx status with the
    /// resource that was being fetched.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: Resource,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        tracing::debug!(%url, %resource, "fetching");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "upstream returned non-success");
            return Err(ClientError::Fetch { resource, status });
        }

        Ok(response.json::<T>().await?)
    }

    // ==================== Посты ====================

    /// Paginated post listing; upstream supports `limit`/`skip` natively.
    pub async fn get_posts(&self, page: u32, limit: u32) -> Result<Page<Post>, ClientError> {
        let skip = page * limit;
        let envelope: PostsEnvelope = self
            .get_json(
                &format!("/posts?limit={}&skip={}", limit, skip),
                Resource::Posts,
            )
            .await?;

        Ok(Page {
            data: envelope.posts.into_iter().map(Post::from_raw).collect(),
            total: Some(envelope.total),
            page,
            limit,
        })
    }

    /// Posts carrying a tag. The tag endpoint returns the full matching set
    /// in one response, so pagination is applied here: the slice
    /// `[page*limit, page*limit+limit)` of the upstream order, unsorted.
    pub async fn get_posts_by_tag(
        &self,
        tag: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Post>, ClientError> {
        let envelope: PostsEnvelope = self
            .get_json(&format!("/posts/tag/{}", tag), Resource::PostsByTag)
            .await?;

        let start = (page * limit) as usize;
        let data: Vec<Post> = envelope
            .posts
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .map(Post::from_raw)
            .collect();

        Ok(Page {
            data,
            total: Some(envelope.total),
            page,
            limit,
        })
    }

    pub async fn get_post(&self, id: u64) -> Result<Post, ClientError> {
        let raw: RawPost = self
            .get_json(&format!("/posts/{}", id), Resource::Post)
            .await?;
        Ok(Post::from_raw(raw))
    }

    // ==================== Комментарии ====================

    /// All comments for one post; upstream does not paginate these.
    pub async fn get_post_comments(&self, post_id: u64) -> Result<Listing<Comment>, ClientError> {
        let envelope: CommentsEnvelope = self
            .get_json(&format!("/comments/post/{}", post_id), Resource::Comments)
            .await?;

        Ok(Listing {
            data: envelope
                .comments
                .into_iter()
                .map(Comment::from_raw)
                .collect(),
        })
    }

    // ==================== Теги ====================

    /// The tag list comes back as a bare string array; it is wrapped to
    /// keep the list contract uniform across endpoints.
    pub async fn get_tags(&self) -> Result<TagList, ClientError> {
        let tags: Vec<String> = self.get_json("/posts/tag-list", Resource::Tags).await?;
        Ok(TagList { data: tags })
    }

    // ==================== Пользователи ====================

    pub async fn get_users(&self, page: u32, limit: u32) -> Result<Page<User>, ClientError> {
        let skip = page * limit;
        let envelope: UsersEnvelope = self
            .get_json(
                &format!("/users?limit={}&skip={}", limit, skip),
                Resource::Users,
            )
            .await?;

        Ok(Page {
            data: envelope.users.into_iter().map(User::from_raw).collect(),
            total: Some(envelope.total),
            page,
            limit,
        })
    }

    pub async fn get_user(&self, id: u64) -> Result<User, ClientError> {
        let raw: RawUser = self
            .get_json(&format!("/users/{}", id), Resource::User)
            .await?;
        Ok(User::from_raw(raw))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
