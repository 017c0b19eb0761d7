pub mod error;
pub mod http_client;
pub mod models;
pub mod upstream;

pub use error::{ClientError, Resource};
pub use http_client::{ApiClient, DEFAULT_LIMIT};
pub use models::{Comment, Listing, Owner, Page, Post, TagList, User};
