use crate::gateway::PostSink;
use crate::model::{DumpRecord, Post, PostSnapshot};
use devhub_primitives::{BlockHeight, PostId};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;


#[derive(Default)]
struct Tables {
    dumps: BTreeMap<String, DumpRecord>,
    posts: BTreeMap<PostId, Post>,
    snapshots: BTreeMap<(PostId, BlockHeight), PostSnapshot>,
    writes: usize
}


/// In-process store with the same keys and upsert semantics as the remote one
#[derive(Clone, Default)]
pub struct MemorySink {
    tables: Arc<Mutex<Tables>>
}


impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dumps(&self) -> Vec<DumpRecord> {
        self.tables.lock().dumps.values().cloned().collect()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.tables.lock().posts.values().cloned().collect()
    }

    pub fn snapshots(&self) -> Vec<PostSnapshot> {
        self.tables.lock().snapshots.values().cloned().collect()
    }

    /// Number of accepted writes, including the ones that replaced a row
    pub fn writes(&self) -> usize {
        self.tables.lock().writes
    }
}


impl PostSink for MemorySink {
    async fn upsert_dump(&self, dump: &DumpRecord) -> anyhow::Result<()> {
        let mut tables = self.tables.lock();
        tables.dumps.insert(dump.receipt_id.clone(), dump.clone());
        tables.writes += 1;
        Ok(())
    }

    async fn upsert_post(&self, post: &Post) -> anyhow::Result<()> {
        let mut tables = self.tables.lock();
        tables.posts.insert(post.id, post.clone());
        tables.writes += 1;
        Ok(())
    }

    async fn upsert_post_snapshot(&self, snapshot: &PostSnapshot) -> anyhow::Result<()> {
        let mut tables = self.tables.lock();
        tables.snapshots.insert((snapshot.post_id, snapshot.block_height), snapshot.clone());
        tables.writes += 1;
        Ok(())
    }
}
