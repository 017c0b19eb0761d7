use reader_client::{Page, Post};

use super::Command;

#[derive(Debug, Clone)]
pub enum PostsMsg {
    /// Screen mounted; issue the first fetch.
    Load,
    /// Tag filter changed (None = all posts). Resets to page 0.
    TagSelected(Option<String>),
    NextPage,
    PrevPage,
    Retry,
    Loaded { ticket: u64, page: Page<Post> },
    Failed { ticket: u64, message: String },
}

/// State behind the post list screen: grid of posts, tag filter,
/// previous/next pagination.
#[derive(Debug)]
pub struct PostsController {
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub selected_tag: Option<String>,
    limit: u32,
    ticket: u64,
}

impl PostsController {
    pub fn new(limit: u32) -> Self {
        Self {
            posts: Vec::new(),
            loading: false,
            error: None,
            page: 0,
            selected_tag: None,
            limit,
            ticket: 0,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// A full page means more may exist; a short page is the last one.
    pub fn can_go_next(&self) -> bool {
        !self.loading && self.posts.len() as u32 == self.limit
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 0
    }

    pub fn update(&mut self, msg: PostsMsg) -> Option<Command> {
        match msg {
            PostsMsg::Load | PostsMsg::Retry => Some(self.issue()),

            PostsMsg::TagSelected(tag) => {
                if tag == self.selected_tag {
                    return None;
                }
                self.selected_tag = tag;
                self.page = 0;
                Some(self.issue())
            }

            PostsMsg::NextPage => {
                if !self.can_go_next() {
                    return None;
                }
                self.page += 1;
                Some(self.issue())
            }

            PostsMsg::PrevPage => {
                if !self.can_go_prev() {
                    return None;
                }
                self.page -= 1;
                Some(self.issue())
            }

            PostsMsg::Loaded { ticket, page } => {
                if ticket != self.ticket {
                    tracing::debug!(ticket, current = self.ticket, "dropping superseded posts reply");
                    return None;
                }
                self.posts = page.data;
                self.loading = false;
                None
            }

            PostsMsg::Failed { ticket, message } => {
                if ticket != self.ticket {
                    return None;
                }
                self.error = Some(message);
                self.loading = false;
                None
            }
        }
    }

    fn issue(&mut self) -> Command {
        self.loading = true;
        self.error = None;
        self.ticket += 1;
        Command::FetchPosts {
            ticket: self.ticket,
            tag: self.selected_tag.clone(),
            page: self.page,
            limit: self.limit,
        }
    }
}
