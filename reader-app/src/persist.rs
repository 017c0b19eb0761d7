//! Append-only persistence of fetched user records.
//!
//! One document per record, one write per document, no dedup and no read
//! path: re-persisting a page duplicates its documents. Failures are
//! logged and swallowed — persistence is background work and must never
//! reach the screen.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use reader_client::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-document operation against a named collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn append(&self, collection: &str, document: serde_json::Value)
        -> Result<(), StoreError>;
}

/// What gets written per fetched user. `doc_id` plays the role of the
/// store's auto-generated document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    pub doc_id: Uuid,
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture: String,
    pub title: String,
    pub saved_at: DateTime<Utc>,
}

impl UserDocument {
    pub fn new(user: &User) -> Self {
        Self {
            doc_id: Uuid::new_v4(),
            user_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            picture: user.picture.clone(),
            title: user.title.clone(),
            saved_at: Utc::now(),
        }
    }
}

/// Fire-and-forget writer for pages of users.
pub struct UserSink {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl UserSink {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Append one document per record, sequentially. Never fails: every
    /// write error is logged at warn and dropped.
    pub async fn persist(&self, users: &[User]) {
        for user in users {
            let document = match serde_json::to_value(UserDocument::new(user)) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(user_id = user.id, error = %e, "could not serialize user document");
                    continue;
                }
            };

            if let Err(e) = self.store.append(&self.collection, document).await {
                tracing::warn!(
                    user_id = user.id,
                    collection = %self.collection,
                    error = %e,
                    "failed to persist user document"
                );
            }
        }
        tracing::debug!(count = users.len(), collection = %self.collection, "persisted user page");
    }
}

/// Document store backed by one JSON-lines file per collection.
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentStore for JsonlStore {
    async fn append(
        &self,
        collection: &str,
        document: serde_json::Value,
    ) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(format!("{}.jsonl", collection));
        let mut line = serde_json::to_string(&document)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
