use base64::Engine;
use devhub_data::near::Block;
use devhub_processor::{
    BlockProcessor, BlockReport, Contract, DumpRecord, MemorySink, Post, PostSink, PostSnapshot
};
use serde_json::{json, Value};


const CONTRACT: &str = "devgovgigs.near";
const HEIGHT: u64 = 97_000_000;


fn encode_args(args: &Value) -> String {
    base64::engine::general_purpose::STANDARD.encode(args.to_string())
}


fn post_entry(id: u64, author: &str) -> Value {
    let mut key = vec![0x05];
    key.extend_from_slice(&id.to_le_bytes());

    let mut value = vec![0];
    value.extend_from_slice(&id.to_le_bytes());
    value.extend_from_slice(&(author.len() as u32).to_le_bytes());
    value.extend_from_slice(author.as_bytes());

    let b64 = base64::engine::general_purpose::STANDARD;
    json!({
        "type": "data_update",
        "change": {
            "accountId": CONTRACT,
            "keyBase64": b64.encode(key),
            "valueBase64": b64.encode(value)
        }
    })
}


fn call(receipt_id: &str, signer: &str, method: &str, args: String) -> Value {
    json!({
        "receiptId": receipt_id,
        "signerId": signer,
        "receiverId": CONTRACT,
        "operations": [{"FunctionCall": {"methodName": method, "args": args}}]
    })
}


fn block(actions: Vec<Value>, state_changes: Vec<Value>) -> Block {
    serde_json::from_value(json!({
        "header": {"height": HEIGHT, "hash": "hash", "prevHash": "prev"},
        "actions": actions,
        "shards": [{"shardId": 0, "stateChanges": state_changes}]
    })).unwrap()
}


fn idea_args(parent_id: Option<u64>) -> Value {
    json!({
        "parent_id": parent_id,
        "labels": ["rust"],
        "body": {"post_type": "Idea", "idea_version": "V1", "name": "Indexer", "description": "Index posts"}
    })
}


#[tokio::test]
async fn add_post_with_matching_storage_write() {
    let sink = MemorySink::new();
    let processor = BlockProcessor::new(Contract::default(), sink.clone());

    let block = block(
        vec![call("r1", "bob.near", "add_post", encode_args(&idea_args(Some(2))))],
        vec![post_entry(7, "bob.near")]
    );

    let report = processor.process(&block).await;

    assert_eq!(report, BlockReport {
        block_height: HEIGHT,
        operations: 1,
        decode_failures: 0,
        persisted: 1,
        posts_created: 1,
        dropped: 0,
        failed: 0
    });

    assert_eq!(sink.posts(), vec![Post {
        id: 7,
        parent_id: Some(2),
        author_id: "bob.near".to_string()
    }]);

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].post_id, 7);
    assert_eq!(snapshots[0].block_height, HEIGHT);
    assert_eq!(snapshots[0].editor_id, "bob.near");
    assert_eq!(snapshots[0].labels, vec!["rust".to_string()]);
    assert_eq!(snapshots[0].name.as_deref(), Some("Indexer"));

    let dumps = sink.dumps();
    assert_eq!(dumps.len(), 1);
    assert_eq!(dumps[0].post_id, Some(7));
    assert_eq!(serde_json::from_str::<Value>(&dumps[0].args).unwrap(), idea_args(Some(2)));
}


#[tokio::test]
async fn edit_post_without_storage_write_is_dumped_only() {
    let sink = MemorySink::new();
    let processor = BlockProcessor::new(Contract::default(), sink.clone());

    let args = json!({"id": 7, "labels": [], "body": {"post_type": "Idea", "name": "n", "description": "d"}});
    let block = block(
        vec![call("r2", "eve.near", "edit_post", encode_args(&args))],
        vec![post_entry(7, "bob.near")]
    );

    let report = processor.process(&block).await;

    assert_eq!(report.dropped, 1);
    assert_eq!(report.persisted, 0);
    assert!(sink.posts().is_empty());
    assert!(sink.snapshots().is_empty());

    let dumps = sink.dumps();
    assert_eq!(dumps.len(), 1);
    assert_eq!(dumps[0].receipt_id, "r2");
    assert_eq!(dumps[0].method_name, "edit_post");
    assert_eq!(dumps[0].post_id, None);
}


#[tokio::test]
async fn edit_post_without_id_is_still_indexed() {
    let sink = MemorySink::new();
    let processor = BlockProcessor::new(Contract::default(), sink.clone());

    let args = json!({"labels": [], "body": {"post_type": "Comment", "description": "fixed typo", "sponsorship_token": null}});
    let block = block(
        vec![call("r4", "bob.near", "edit_post", encode_args(&args))],
        vec![post_entry(7, "bob.near")]
    );

    let report = processor.process(&block).await;

    assert_eq!(report.decode_failures, 0);
    assert_eq!(report.persisted, 1);
    assert_eq!(sink.dumps()[0].post_id, Some(7));

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].post_id, 7);
    assert_eq!(snapshots[0].description.as_deref(), Some("fixed typo"));
    assert_eq!(snapshots[0].sponsorship_token.as_deref(), Some("null"));
}


#[tokio::test]
async fn undecodable_args_produce_no_writes() {
    let sink = MemorySink::new();
    let processor = BlockProcessor::new(Contract::default(), sink.clone());

    let block = block(
        vec![call("r3", "bob.near", "add_post", "eyJib2R5Ijog".to_string())],
        vec![post_entry(7, "bob.near")]
    );

    let report = processor.process(&block).await;

    assert_eq!(report.decode_failures, 1);
    assert_eq!(report.operations, 0);
    assert_eq!(sink.writes(), 0);
}


#[tokio::test]
async fn redelivered_block_does_not_duplicate_rows() {
    let sink = MemorySink::new();
    let processor = BlockProcessor::new(Contract::default(), sink.clone());

    let block = block(
        vec![
            call("r1", "bob.near", "add_post", encode_args(&idea_args(None))),
            call("r2", "carol.near", "add_post", encode_args(&idea_args(Some(1))))
        ],
        vec![post_entry(8, "bob.near"), post_entry(9, "carol.near")]
    );

    processor.process(&block).await;
    processor.process(&block).await;

    assert_eq!(sink.writes(), 12);
    assert_eq!(sink.dumps().len(), 2);
    assert_eq!(sink.posts().len(), 2);
    assert_eq!(sink.snapshots().len(), 2);
}


#[tokio::test]
async fn same_author_twice_in_a_block_collapses_to_the_last_post() {
    let sink = MemorySink::new();
    let processor = BlockProcessor::new(Contract::default(), sink.clone());

    let block = block(
        vec![
            call("r1", "bob.near", "add_post", encode_args(&idea_args(None))),
            call("r2", "bob.near", "add_post", encode_args(&idea_args(None)))
        ],
        vec![post_entry(10, "bob.near"), post_entry(11, "bob.near")]
    );

    let report = processor.process(&block).await;

    assert_eq!(report.persisted, 2);
    let dumps = sink.dumps();
    assert!(dumps.iter().all(|d| d.post_id == Some(11)));
    assert_eq!(sink.posts().iter().map(|p| p.id).collect::<Vec<_>>(), vec![11]);
    assert_eq!(sink.snapshots().len(), 1);
}


/// Rejects writes of the listed receipts and posts, stores everything else
struct FailingSink {
    inner: MemorySink,
    failing_dumps: Vec<String>,
    failing_posts: Vec<u64>
}


impl PostSink for FailingSink {
    async fn upsert_dump(&self, dump: &DumpRecord) -> anyhow::Result<()> {
        anyhow::ensure!(!self.failing_dumps.contains(&dump.receipt_id), "connection reset");
        self.inner.upsert_dump(dump).await
    }

    async fn upsert_post(&self, post: &Post) -> anyhow::Result<()> {
        anyhow::ensure!(!self.failing_posts.contains(&post.id), "constraint violation");
        self.inner.upsert_post(post).await
    }

    async fn upsert_post_snapshot(&self, snapshot: &PostSnapshot) -> anyhow::Result<()> {
        self.inner.upsert_post_snapshot(snapshot).await
    }
}


#[tokio::test]
async fn write_failures_are_isolated_per_operation() {
    let memory = MemorySink::new();
    let sink = FailingSink {
        inner: memory.clone(),
        failing_dumps: vec!["r1".to_string()],
        failing_posts: vec![9]
    };
    let processor = BlockProcessor::new(Contract::default(), sink);

    let edit = json!({"id": 12, "labels": [], "body": {"post_type": "Comment", "description": "ok"}});
    let block = block(
        vec![
            call("r1", "bob.near", "add_post", encode_args(&idea_args(None))),
            call("r2", "carol.near", "add_post", encode_args(&idea_args(None))),
            call("r3", "dave.near", "edit_post", encode_args(&edit))
        ],
        vec![post_entry(8, "bob.near"), post_entry(9, "carol.near"), post_entry(12, "dave.near")]
    );

    let report = processor.process(&block).await;

    assert_eq!(report.operations, 3);
    assert_eq!(report.failed, 2);
    assert_eq!(report.persisted, 1);

    // r1 failed at the dump, r2 at the post: neither got a snapshot
    let receipts: Vec<_> = memory.dumps().into_iter().map(|d| d.receipt_id).collect();
    assert_eq!(receipts, vec!["r2".to_string(), "r3".to_string()]);
    assert!(memory.posts().is_empty());
    let snapshots = memory.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].post_id, 12);
}


#[tokio::test]
async fn calls_to_other_contracts_are_ignored() {
    let sink = MemorySink::new();
    let processor = BlockProcessor::new(Contract::new("other.near", Contract::default().methods), sink.clone());

    let block = block(
        vec![call("r1", "bob.near", "add_post", encode_args(&idea_args(None)))],
        vec![post_entry(8, "bob.near")]
    );

    let report = processor.process(&block).await;

    assert_eq!(report.operations, 0);
    assert_eq!(sink.writes(), 0);
}
