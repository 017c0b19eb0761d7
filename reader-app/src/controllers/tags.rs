use super::Command;

#[derive(Debug, Clone)]
pub enum TagsMsg {
    Load,
    Loaded { ticket: u64, tags: Vec<String> },
    Failed { ticket: u64, message: String },
}

/// State behind the tag filter strip.
#[derive(Debug, Default)]
pub struct TagsController {
    pub tags: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    ticket: u64,
}

impl TagsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, msg: TagsMsg) -> Option<Command> {
        match msg {
            TagsMsg::Load => {
                self.loading = true;
                self.error = None;
                self.ticket += 1;
                Some(Command::FetchTags {
                    ticket: self.ticket,
                })
            }
            TagsMsg::Loaded { ticket, tags } => {
                if ticket != self.ticket {
                    return None;
                }
                self.tags = tags;
                self.loading = false;
                None
            }
            TagsMsg::Failed { ticket, message } => {
                if ticket != self.ticket {
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

    #[test]
    fn loads_the_tag_list_once() {
        let mut c = TagsController::new();
        let cmd = c.update(TagsMsg::Load);
        assert_eq!(cmd, Some(Command::FetchTags { ticket: 1 }));

        c.update(TagsMsg::Loaded {
            ticket: 1,
            tags: vec!["history".into(), "love".into()],
        });
        assert!(!c.loading);
        assert_eq!(c.tags, vec!["history", "love"]);
    }

    #[test]
    fn failure_is_recorded() {
        let mut c = TagsController::new();
        c.update(TagsMsg::Load);
        c.update(TagsMsg::Failed {
            ticket: 1,
            message: "Failed to fetch tags".into(),
        });
        assert_eq!(c.error.as_deref(), Some("Failed to fetch tags"));
        assert!(!c.loading);
    }
}
