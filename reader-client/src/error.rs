use reqwest::StatusCode;
use thiserror::Error;

/// Resource kinds the upstream API serves, used to tag fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Posts,
    PostsByTag,
    Post,
    Comments,
    Tags,
    Users,
    User,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Posts => "posts",
            Resource::PostsByTag => "posts by tag",
            Resource::Post => "post",
            Resource::Comments => "comments",
            Resource::Tags => "tags",
            Resource::Users => "users",
            Resource::User => "user",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    // Не-2xx ответ от API, помечен ресурсом
    #[error("Failed to fetch {resource}")]
    Fetch {
        resource: Resource,
        status: StatusCode,
    },

    // Транспортные ошибки и ошибки декодирования
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn resource(&self) -> Option<Resource> {
        match self {
            ClientError::Fetch { resource, .. } => Some(*resource),
            ClientError::Http(_) => None,
        }
    }
}
