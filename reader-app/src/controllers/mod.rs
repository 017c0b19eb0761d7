//! Per-screen state machines.
//!
//! Controllers hold exactly what a screen renders: items, a loading flag,
//! a nullable error, and the screen's filters. They never touch the
//! network themselves; `update` returns a [`Command`] the driver executes
//! against the client, feeding the result back as a message. Every issued
//! fetch carries a ticket, and a reply whose ticket is no longer current
//! is dropped — changing a filter supersedes the in-flight request
//! explicitly instead of letting the slower response win.

mod comments;
mod posts;
mod tags;
mod users;

pub use comments::{CommentsController, CommentsMsg};
pub use posts::{PostsController, PostsMsg};
pub use tags::{TagsController, TagsMsg};
pub use users::{UsersController, UsersMsg};

use reader_client::User;

/// Side effects a controller asks its driver to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchPosts {
        ticket: u64,
        tag: Option<String>,
        page: u32,
        limit: u32,
    },
    FetchTags {
        ticket: u64,
    },
    FetchComments {
        ticket: u64,
        post_id: u64,
    },
    FetchUsers {
        ticket: u64,
        page: u32,
        limit: u32,
    },
    /// Write the page of users that was just displayed into the document
    /// store. Best-effort; the driver must not surface its failures.
    PersistUsers(Vec<User>),
}
