pub mod controllers;
pub mod persist;
pub mod session;

pub use controllers::{
    Command, CommentsController, CommentsMsg, PostsController, PostsMsg, TagsController, TagsMsg,
    UsersController, UsersMsg,
};
pub use persist::{DocumentStore, JsonlStore, StoreError, UserDocument, UserSink};
pub use session::{
    AuthError, FileGateway, Identity, IdentityGateway, ProviderStatus, SessionProvider,
    SessionState,
};
