use reader_client::Comment;

use super::Command;

#[derive(Debug, Clone)]
pub enum CommentsMsg {
    /// Open the modal for a post and fetch its comments.
    Open(u64),
    Close,
    Loaded { ticket: u64, comments: Vec<Comment> },
    Failed { ticket: u64, message: String },
}

/// State behind the comments modal. Closing the modal supersedes any
/// in-flight fetch; its reply is dropped when it lands.
#[derive(Debug, Default)]
pub struct CommentsController {
    pub post_id: Option<u64>,
    pub comments: Vec<Comment>,
    pub loading: bool,
    pub error: Option<String>,
    ticket: u64,
}

impl CommentsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.post_id.is_some()
    }

    pub fn update(&mut self, msg: CommentsMsg) -> Option<Command> {
        match msg {
            CommentsMsg::Open(post_id) => {
                self.post_id = Some(post_id);
                self.comments.clear();
                self.loading = true;
                self.error = None;
                self.ticket += 1;
                Some(Command::FetchComments {
                    ticket: self.ticket,
                    post_id,
                })
            }
            CommentsMsg::Close => {
                self.post_id = None;
                self.comments.clear();
                self.loading = false;
                self.error = None;
                // bump so a reply for the closed modal never lands
                self.ticket += 1;
                None
            }
            CommentsMsg::Loaded { ticket, comments } => {
                if ticket != self.ticket || !self.is_open() {
                    return None;
                }
                self.comments = comments;
                self.loading = false;
                None
            }
            CommentsMsg::Failed { ticket, message } => {
                if ticket != self.ticket || !self.is_open() {
                    return None;
                }
                self.error = Some(message);
                self.loading = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reader_client::Owner;

    fn comment(id: u64) -> Comment {
        Comment {
            id,
            message: "hi".into(),
            publish_date: Utc::now(),
            owner: Owner {
                id: 9,
                first_name: "jane".into(),
                last_name: "doe".into(),
                picture: "https://i.pravatar.cc/150?u=9".into(),
                title: None,
            },
        }
    }

    #[test]
    fn open_fetches_and_loaded_settles() {
        let mut c = CommentsController::new();
        let cmd = c.update(CommentsMsg::Open(6));
        assert_eq!(
            cmd,
            Some(Command::FetchComments {
                ticket: 1,
                post_id: 6
            })
        );
        assert!(c.loading);

        c.update(CommentsMsg::Loaded {
            ticket: 1,
            comments: vec![comment(1), comment(2)],
        });
        assert!(!c.loading);
        assert_eq!(c.comments.len(), 2);
    }

    #[test]
    fn reply_after_close_is_dropped() {
        let mut c = CommentsController::new();
        c.update(CommentsMsg::Open(6));
        c.update(CommentsMsg::Close);

        c.update(CommentsMsg::Loaded {
            ticket: 1,
            comments: vec![comment(1)],
        });
        assert!(!c.is_open());
        assert!(c.comments.is_empty());
    }

    #[test]
    fn reopening_another_post_supersedes_the_first_fetch() {
        let mut c = CommentsController::new();
        c.update(CommentsMsg::Open(6)); // ticket 1
        c.update(CommentsMsg::Open(7)); // ticket 2

        c.update(CommentsMsg::Loaded {
            ticket: 1,
            comments: vec![comment(1)],
        });
        assert!(c.loading, "first post's comments must not fill the modal");

        c.update(CommentsMsg::Loaded {
            ticket: 2,
            comments: vec![comment(2)],
        });
        assert_eq!(c.comments[0].id, 2);
    }
}
