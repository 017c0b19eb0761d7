use reader_client::{Page, User};

use super::Command;

#[derive(Debug, Clone)]
pub enum UsersMsg {
    Load,
    NextPage,
    PrevPage,
    Retry,
    Loaded { ticket: u64, page: Page<User> },
    Failed { ticket: u64, message: String },
}

/// State behind the (sign-in gated) user directory. A successful load
/// additionally asks the driver to persist the very page that was just
/// displayed — one fetch feeds both the screen and the document store.
#[derive(Debug)]
pub struct UsersController {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    limit: u32,
    ticket: u64,
}

impl UsersController {
    pub fn new(limit: u32) -> Self {
        Self {
            users: Vec::new(),
            loading: false,
            error: None,
            page: 0,
            limit,
            ticket: 0,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn can_go_next(&self) -> bool {
        !self.loading && self.users.len() as u32 == self.limit
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 0
    }

    pub fn update(&mut self, msg: UsersMsg) -> Option<Command> {
        match msg {
            UsersMsg::Load | UsersMsg::Retry => Some(self.issue()),

            UsersMsg::NextPage => {
                if !self.can_go_next() {
                    return None;
                }
                self.page += 1;
                Some(self.issue())
            }

            UsersMsg::PrevPage => {
                if !self.can_go_prev() {
                    return None;
                }
                self.page -= 1;
                Some(self.issue())
            }

            UsersMsg::Loaded { ticket, page } => {
                if ticket != self.ticket {
                    tracing::debug!(ticket, current = self.ticket, "dropping superseded users reply");
                    return None;
                }
                self.users = page.data;
                self.loading = false;
                Some(Command::PersistUsers(self.users.clone()))
            }

            UsersMsg::Failed { ticket, message } => {
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
        Command::FetchUsers {
            ticket: self.ticket,
            page: self.page,
            limit: self.limit,
        }
    }
}
