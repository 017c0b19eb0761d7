use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use reader_app::{
    AuthError, Command as ScreenCommand, CommentsController, CommentsMsg, FileGateway, Identity,
    JsonlStore, PostsController, PostsMsg, SessionProvider, SessionState, TagsController, TagsMsg,
    UserSink, UsersController, UsersMsg,
};
use reader_client::{ApiClient, ClientError, Post, User, DEFAULT_LIMIT};

#[derive(Parser)]
#[command(name = "blog-reader", author, version, about = "Read posts, comments and users from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the content API
    #[arg(long, env = "READER_API_URL", default_value = "https://dummyjson.com")]
    api_url: String,

    /// Directory for the session file and persisted documents
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, optionally filtered by tag
    Posts {
        #[arg(short, long)]
        tag: Option<String>,

        #[arg(short, long, default_value_t = 0)]
        page: u32,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },

    /// Show a single post
    Post {
        #[arg(short, long)]
        id: u64,
    },

    /// Show the comments of a post
    Comments {
        #[arg(short, long)]
        post_id: u64,
    },

    /// List all available tags
    Tags,

    /// List users (requires sign-in); each shown page is also persisted
    Users {
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },

    /// Show a single user (requires sign-in)
    User {
        #[arg(short, long)]
        id: u64,
    },

    /// Sign in with a local profile
    Login {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        photo: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the current session
    Status,
}

fn state_dir(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(dir) => Ok(dir),
        None => {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".blog_reader"))
        }
    }
}

fn session_provider(dir: &PathBuf, account: Option<Identity>) -> SessionProvider {
    let gateway = FileGateway::new(dir.join("session.json"), account);
    SessionProvider::new(Arc::new(gateway))
}

/// Wait until the provider has decided whether someone is signed in.
/// Protected screens must not render while the state is indeterminate.
async fn settled_state(provider: &SessionProvider) -> Result<SessionState> {
    let mut rx = provider.subscribe();
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| !matches!(s, SessionState::Indeterminate)),
    )
    .await
    .context("Timed out waiting for the session to settle")?
    .context("Session provider stopped")?;
    Ok(state.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let dir = state_dir(cli.state_dir)?;
    let client = ApiClient::new(&cli.api_url);

    match cli.command {
        Commands::Posts { tag, page, limit } => run_posts(&client, tag, page, limit).await,
        Commands::Post { id } => run_post(&client, id).await,
        Commands::Comments { post_id } => run_comments(&client, post_id).await,
        Commands::Tags => run_tags(&client).await,
        Commands::Users { page, limit } => run_users(&client, &dir, page, limit).await,
        Commands::User { id } => run_user(&client, &dir, id).await,
        Commands::Login { name, email, photo } => run_login(&dir, name, email, photo).await,
        Commands::Logout => run_logout(&dir).await,
        Commands::Status => run_status(&dir).await,
    }
}

// ==================== Посты ====================

async fn run_posts(
    client: &ApiClient,
    tag: Option<String>,
    target_page: u32,
    limit: u32,
) -> Result<()> {
    let mut screen = PostsController::new(limit);

    let mut command = screen.update(PostsMsg::Load);
    if tag.is_some() {
        // supersedes the unfiltered mount fetch
        command = screen.update(PostsMsg::TagSelected(tag));
    }

    while let Some(cmd) = command.take() {
        exec_posts(client, &mut screen, cmd).await;
        if screen.error.is_none() && screen.page < target_page && screen.can_go_next() {
            command = screen.update(PostsMsg::NextPage);
        }
    }

    if let Some(message) = &screen.error {
        println!("{} {}", "❌".red(), message.red());
        std::process::exit(1);
    }

    match &screen.selected_tag {
        Some(tag) => println!("📰 Posts tagged {} — page {}", tag.bold(), screen.page + 1),
        None => println!("📰 All posts — page {}", screen.page + 1),
    }
    if screen.page < target_page {
        println!("   (page {} does not exist; stopped at the last page)", target_page + 1);
    }
    println!();

    for post in &screen.posts {
        print_post(post);
    }
    if screen.posts.is_empty() {
        println!("   No posts found");
    }

    print_pagination(screen.page, screen.can_go_prev(), screen.can_go_next());
    Ok(())
}

async fn exec_posts(client: &ApiClient, screen: &mut PostsController, cmd: ScreenCommand) {
    if let ScreenCommand::FetchPosts {
        ticket,
        tag,
        page,
        limit,
    } = cmd
    {
        let result = match tag {
            Some(tag) => client.get_posts_by_tag(&tag, page, limit).await,
            None => client.get_posts(page, limit).await,
        };
        let msg = match result {
            Ok(page) => PostsMsg::Loaded { ticket, page },
            Err(e) => PostsMsg::Failed {
                ticket,
                message: e.to_string(),
            },
        };
        screen.update(msg);
    }
}

async fn run_post(client: &ApiClient, id: u64) -> Result<()> {
    match client.get_post(id).await {
        Ok(post) => {
            print_post(&post);
            Ok(())
        }
        Err(e) => fail_fetch(e),
    }
}

// ==================== Комментарии ====================

async fn run_comments(client: &ApiClient, post_id: u64) -> Result<()> {
    let mut modal = CommentsController::new();
    if let Some(ScreenCommand::FetchComments { ticket, post_id }) =
        modal.update(CommentsMsg::Open(post_id))
    {
        let msg = match client.get_post_comments(post_id).await {
            Ok(listing) => CommentsMsg::Loaded {
                ticket,
                comments: listing.data,
            },
            Err(e) => CommentsMsg::Failed {
                ticket,
                message: e.to_string(),
            },
        };
        modal.update(msg);
    }

    if let Some(message) = &modal.error {
        println!("{} {}", "❌".red(), message.red());
        std::process::exit(1);
    }

    println!("💬 Comments for post #{}\n", post_id);
    for comment in &modal.comments {
        println!(
            "   {} {}",
            format!("{} {}", comment.owner.first_name, comment.owner.last_name).bold(),
            format!("({})", comment.publish_date.format("%Y-%m-%d %H:%M")).dimmed()
        );
        println!("   {}\n", comment.message);
    }
    if modal.comments.is_empty() {
        println!("   No comments yet");
    }
    Ok(())
}

// ==================== Теги ====================

async fn run_tags(client: &ApiClient) -> Result<()> {
    let mut filter = TagsController::new();
    if let Some(ScreenCommand::FetchTags { ticket }) = filter.update(TagsMsg::Load) {
        let msg = match client.get_tags().await {
            Ok(tags) => TagsMsg::Loaded {
                ticket,
                tags: tags.data,
            },
            Err(e) => TagsMsg::Failed {
                ticket,
                message: e.to_string(),
            },
        };
        filter.update(msg);
    }

    if let Some(message) = &filter.error {
        println!("{} {}", "❌".red(), message.red());
        std::process::exit(1);
    }

    println!("🏷  {} tags available:", filter.tags.len());
    for tag in &filter.tags {
        println!("   {}", tag);
    }
    Ok(())
}

// ==================== Пользователи ====================

async fn require_sign_in(dir: &PathBuf) -> Result<Identity> {
    let provider = session_provider(dir, None);
    match settled_state(&provider).await? {
        SessionState::SignedIn(identity) => Ok(identity),
        _ => {
            println!("{}", "❌ The user directory requires sign-in".red());
            println!("   Run: blog-reader login --name <name> --email <email>");
            std::process::exit(1);
        }
    }
}

async fn run_users(client: &ApiClient, dir: &PathBuf, target_page: u32, limit: u32) -> Result<()> {
    let identity = require_sign_in(dir).await?;
    println!("🔓 Signed in as {}\n", identity.display_name.bold());

    let sink = UserSink::new(Arc::new(JsonlStore::new(dir.clone())), "users");
    let mut screen = UsersController::new(limit);

    let mut command = screen.update(UsersMsg::Load);
    while let Some(cmd) = command.take() {
        command = exec_users(client, &sink, &mut screen, cmd).await;
        if command.is_none()
            && screen.error.is_none()
            && screen.page < target_page
            && screen.can_go_next()
        {
            command = screen.update(UsersMsg::NextPage);
        }
    }

    if let Some(message) = &screen.error {
        println!("{} {}", "❌".red(), message.red());
        std::process::exit(1);
    }

    println!("👥 Users — page {}\n", screen.page + 1);
    for user in &screen.users {
        print_user(user);
    }
    if screen.users.is_empty() {
        println!("   No users found");
    }

    print_pagination(screen.page, screen.can_go_prev(), screen.can_go_next());
    println!(
        "{}",
        format!("   Saved {} documents to {:?}", screen.users.len(), dir.join("users.jsonl"))
            .dimmed()
    );
    Ok(())
}

async fn exec_users(
    client: &ApiClient,
    sink: &UserSink,
    screen: &mut UsersController,
    cmd: ScreenCommand,
) -> Option<ScreenCommand> {
    match cmd {
        ScreenCommand::FetchUsers {
            ticket,
            page,
            limit,
        } => {
            let msg = match client.get_users(page, limit).await {
                Ok(page) => UsersMsg::Loaded { ticket, page },
                Err(e) => UsersMsg::Failed {
                    ticket,
                    message: e.to_string(),
                },
            };
            screen.update(msg)
        }
        ScreenCommand::PersistUsers(users) => {
            // best-effort; the sink swallows its own failures
            sink.persist(&users).await;
            None
        }
        _ => None,
    }
}

async fn run_user(client: &ApiClient, dir: &PathBuf, id: u64) -> Result<()> {
    require_sign_in(dir).await?;

    match client.get_user(id).await {
        Ok(user) => {
            print_user(&user);
            Ok(())
        }
        Err(e) => fail_fetch(e),
    }
}

// ==================== Сессия ====================

async fn run_login(dir: &PathBuf, name: String, email: String, photo: Option<String>) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create state directory {:?}", dir))?;

    let account = Identity {
        display_name: name,
        email,
        photo_url: photo,
    };
    let provider = session_provider(dir, Some(account));

    match provider.sign_in().await {
        Ok(()) => match settled_state(&provider).await? {
            SessionState::SignedIn(identity) => {
                println!("✅ Signed in as {} <{}>", identity.display_name.bold(), identity.email);
                Ok(())
            }
            _ => {
                println!("{}", "❌ Sign-in did not produce a session".red());
                std::process::exit(1);
            }
        },
        Err(e) => {
            print_auth_error(&e);
            std::process::exit(1);
        }
    }
}

async fn run_logout(dir: &PathBuf) -> Result<()> {
    let provider = session_provider(dir, None);
    match provider.sign_out().await {
        Ok(()) => {
            println!("✅ Signed out");
            Ok(())
        }
        Err(e) => {
            print_auth_error(&e);
            std::process::exit(1);
        }
    }
}

async fn run_status(dir: &PathBuf) -> Result<()> {
    let provider = session_provider(dir, None);
    match settled_state(&provider).await? {
        SessionState::SignedIn(identity) => {
            println!("🔑 Signed in");
            println!("   Name:  {}", identity.display_name);
            println!("   Email: {}", identity.email);
            if let Some(photo) = &identity.photo_url {
                println!("   Photo: {}", photo);
            }
        }
        SessionState::SignedOut => {
            println!("❌ Not signed in");
            println!("   Run: blog-reader login --name <name> --email <email>");
        }
        SessionState::Indeterminate => unreachable!("settled_state never returns Indeterminate"),
    }
    Ok(())
}

// ==================== Вывод ====================

fn print_post(post: &Post) {
    println!(
        "▌ #{} {} {}",
        post.id,
        format!("by {} {}", post.owner.first_name, post.owner.last_name).bold(),
        format!("♥ {}", post.likes).red()
    );
    if !post.tags.is_empty() {
        println!("  {}", post.tags.join(", ").cyan());
    }
    println!("  {}", post.text);
    println!("  {}\n", post.image.dimmed());
}

fn print_user(user: &User) {
    println!(
        "▌ #{} {} — {}",
        user.id,
        format!("{} {}", user.first_name, user.last_name).bold(),
        user.title
    );
    println!("  {}", user.email);
    println!("  {}\n", user.picture.dimmed());
}

fn print_pagination(page: u32, prev: bool, next: bool) {
    let prev = if prev { "← prev".normal() } else { "← prev".dimmed() };
    let next = if next { "next →".normal() } else { "next →".dimmed() };
    println!("   {}  page {}  {}", prev, page + 1, next);
}

fn print_auth_error(e: &AuthError) {
    match e {
        AuthError::PopupClosed
        | AuthError::PopupBlocked
        | AuthError::UnauthorizedOrigin
        | AuthError::ProviderDisabled => println!("{} {}", "❌".red(), e.to_string().red()),
        AuthError::Other(message) => println!("{} Sign-in failed: {}", "❌".red(), message.red()),
    }
}

fn fail_fetch(e: ClientError) -> Result<()> {
    println!("{} {}", "❌".red(), e.to_string().red());
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_state_dir_wins_over_home() {
        let dir = state_dir(Some(PathBuf::from("/tmp/reader-test"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/reader-test"));
    }
}
