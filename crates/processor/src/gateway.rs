use crate::model::{DumpRecord, Post, PostSnapshot};
use std::fmt::{Display, Formatter};
use std::future::Future;
use tracing::{debug, error, info};


/// Write capability of the downstream store.
///
/// Every method must be an idempotent upsert on the record's natural key:
/// `receipt_id` for dumps, `id` for posts, `(post_id, block_height)` for snapshots.
pub trait PostSink {
    fn upsert_dump(&self, dump: &DumpRecord) -> impl Future<Output = anyhow::Result<()>>;

    fn upsert_post(&self, post: &Post) -> impl Future<Output = anyhow::Result<()>>;

    fn upsert_post_snapshot(&self, snapshot: &PostSnapshot) -> impl Future<Output = anyhow::Result<()>>;
}


#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Entity {
    Dump,
    Post,
    PostSnapshot
}


impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Entity::Dump => "dump",
            Entity::Post => "post",
            Entity::PostSnapshot => "post snapshot"
        })
    }
}


#[derive(Debug)]
pub struct PersistenceError {
    pub entity: Entity,
    /// Natural key of the record that was not saved
    pub key: String,
    pub error: anyhow::Error
}


impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to save {} {}: {:#}", self.entity, self.key, self.error)
    }
}


impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}


/// Single attempt writes with logging, errors are returned, never retried
pub struct PersistenceGateway<S> {
    sink: S
}


impl<S: PostSink> PersistenceGateway<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink
        }
    }

    pub async fn upsert_dump(&self, dump: &DumpRecord) -> Result<(), PersistenceError> {
        debug!(receipt_id = %dump.receipt_id, "creating a dump");
        match self.sink.upsert_dump(dump).await {
            Ok(()) => {
                info!(
                    receipt_id = %dump.receipt_id,
                    caller = %dump.caller,
                    method = %dump.method_name,
                    post_id = ?dump.post_id,
                    "dump has been saved"
                );
                Ok(())
            },
            Err(err) => {
                error!(
                    error =? err,
                    receipt_id = %dump.receipt_id,
                    caller = %dump.caller,
                    method = %dump.method_name,
                    post_id = ?dump.post_id,
                    "failed to save a dump"
                );
                Err(PersistenceError {
                    entity: Entity::Dump,
                    key: dump.receipt_id.clone(),
                    error: err
                })
            }
        }
    }

    pub async fn upsert_post(&self, post: &Post) -> Result<(), PersistenceError> {
        debug!(post_id = post.id, "creating a post");
        match self.sink.upsert_post(post).await {
            Ok(()) => {
                info!(post_id = post.id, author = %post.author_id, "post has been saved");
                Ok(())
            },
            Err(err) => {
                error!(error =? err, post_id = post.id, "failed to save a post");
                Err(PersistenceError {
                    entity: Entity::Post,
                    key: post.id.to_string(),
                    error: err
                })
            }
        }
    }

    pub async fn upsert_post_snapshot(&self, snapshot: &PostSnapshot) -> Result<(), PersistenceError> {
        debug!(post_id = snapshot.post_id, block_height = snapshot.block_height, "creating a post snapshot");
        match self.sink.upsert_post_snapshot(snapshot).await {
            Ok(()) => {
                info!(
                    post_id = snapshot.post_id,
                    block_height = snapshot.block_height,
                    "post snapshot has been saved"
                );
                Ok(())
            },
            Err(err) => {
                error!(
                    error =? err,
                    post_id = snapshot.post_id,
                    block_height = snapshot.block_height,
                    "failed to save a post snapshot"
                );
                Err(PersistenceError {
                    entity: Entity::PostSnapshot,
                    key: format!("{}@{}", snapshot.post_id, snapshot.block_height),
                    error: err
                })
            }
        }
    }
}
