use borsh::BorshDeserialize;
use devhub_data::near::{Block, StateChange, StateChangeType};
use devhub_primitives::{AccountId, PostId};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tracing::warn;


/// Leading key byte of the contract's post storage
pub const POST_INDEX_TAG: u8 = 0x05;


/// Block scoped mapping from post author to the post id, recovered from
/// the contract's storage writes.
///
/// Several qualifying calls of the same author within one block can not be
/// told apart: the entry written last in block order wins.
#[derive(Debug, Default, Clone)]
pub struct AuthorIndex {
    posts: HashMap<AccountId, PostId>
}


impl AuthorIndex {
    pub fn scan(block: &Block, contract_id: &str) -> Self {
        let mut index = Self::default();

        for change in block.state_changes().filter(|c| is_post_write(c, contract_id)) {
            match decode_post_write(change) {
                Ok(Some((author, post_id))) => {
                    index.insert(author, post_id);
                },
                Ok(None) => {},
                Err(err) => warn!(
                    block_height = block.header.height,
                    error = %err,
                    "skipping malformed post storage entry"
                )
            }
        }

        index
    }

    pub fn insert(&mut self, author: AccountId, post_id: PostId) -> Option<PostId> {
        self.posts.insert(author, post_id)
    }

    pub fn get(&self, author: &str) -> Option<PostId> {
        self.posts.get(author).copied()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}


fn is_post_write(change: &StateChange, contract_id: &str) -> bool {
    change.r#type == StateChangeType::DataUpdate && change.change.account_id == contract_id
}


/// Returns `None` for writes outside of the post namespace
fn decode_post_write(change: &StateChange) -> Result<Option<(AccountId, PostId)>, EntryError> {
    let key = match change.change.key_bytes() {
        Some(key) => key.map_err(EntryError::Base64)?,
        None => return Ok(None)
    };

    if key.first() != Some(&POST_INDEX_TAG) {
        return Ok(None)
    }

    let value = change.change.value_bytes()
        .ok_or(EntryError::MissingValue)?
        .map_err(EntryError::Base64)?;

    decode_post_entry(&key, &value).map(Some)
}


#[derive(BorshDeserialize)]
struct PostKey {
    _tag: u8,
    id: PostId
}


/// Head of a borsh encoded versioned post
#[derive(BorshDeserialize)]
struct PostHead {
    _version: u8,
    _id: PostId,
    author_id: AccountId
}


/// Decodes a post storage entry.
///
/// Key: namespace tag, then the post id as `u64` LE.
/// Value: version byte and id, then the author as a `u32` LE length
/// at offset 9 followed by UTF-8 bytes from offset 13.
pub fn decode_post_entry(key: &[u8], value: &[u8]) -> Result<(AccountId, PostId), EntryError> {
    let key = PostKey::deserialize(&mut &key[..]).map_err(EntryError::Layout)?;
    let head = PostHead::deserialize(&mut &value[..]).map_err(EntryError::Layout)?;
    Ok((head.author_id, key.id))
}


#[derive(Debug)]
pub enum EntryError {
    Base64(base64::DecodeError),
    MissingValue,
    Layout(std::io::Error)
}


impl Display for EntryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryError::Base64(err) => write!(f, "invalid base64: {}", err),
            EntryError::MissingValue => write!(f, "data update has no value"),
            EntryError::Layout(err) => write!(f, "unexpected post entry layout: {}", err)
        }
    }
}


impl std::error::Error for EntryError {}


#[cfg(test)]
mod test {
    use super::{decode_post_entry, AuthorIndex, POST_INDEX_TAG};
    use base64::Engine;
    use devhub_data::near::Block;
    use proptest::prelude::*;
    use serde_json::json;


    const CONTRACT: &str = "devgovgigs.near";


    fn key(tag: u8, id: u64) -> Vec<u8> {
        let mut key = vec![tag];
        key.extend_from_slice(&id.to_le_bytes());
        key
    }

    fn value(id: u64, author: &str) -> Vec<u8> {
        let mut value = vec![0];
        value.extend_from_slice(&id.to_le_bytes());
        value.extend_from_slice(&(author.len() as u32).to_le_bytes());
        value.extend_from_slice(author.as_bytes());
        // trailing fields of the post
        value.extend_from_slice(&[1, 2, 3]);
        value
    }

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn change(account: &str, kind: &str, key: &[u8], value: &[u8]) -> serde_json::Value {
        json!({
            "type": kind,
            "change": {"accountId": account, "keyBase64": b64(key), "valueBase64": b64(value)}
        })
    }

    fn block(shards: Vec<Vec<serde_json::Value>>) -> Block {
        let shards: Vec<_> = shards.into_iter().enumerate().map(|(i, changes)| json!({
            "shardId": i,
            "stateChanges": changes
        })).collect();
        serde_json::from_value(json!({
            "header": {"height": 1, "hash": "h", "prevHash": "p"},
            "shards": shards
        })).unwrap()
    }


    #[test]
    fn entry_layout() {
        let value = value(42, "alice.near");
        assert_eq!(&value[9..13], &10u32.to_le_bytes());
        assert_eq!(&value[13..23], b"alice.near");

        let (author, id) = decode_post_entry(&key(POST_INDEX_TAG, 42), &value).unwrap();
        assert_eq!(author, "alice.near");
        assert_eq!(id, 42);
    }


    #[test]
    fn truncated_entries_are_rejected() {
        assert!(decode_post_entry(&[POST_INDEX_TAG, 1, 0], &value(1, "a.near")).is_err());
        assert!(decode_post_entry(&key(POST_INDEX_TAG, 1), &value(1, "alice.near")[..15]).is_err());

        let mut bad_utf8 = value(1, "ab");
        bad_utf8[13] = 0xff;
        assert!(decode_post_entry(&key(POST_INDEX_TAG, 1), &bad_utf8).is_err());
    }


    #[test]
    fn scan_finds_post_writes() {
        let block = block(vec![
            vec![change(CONTRACT, "data_update", &key(POST_INDEX_TAG, 42), &value(42, "alice.near"))],
            vec![
                change(CONTRACT, "data_update", &key(0x01, 7), &value(7, "bob.near")),
                change("other.near", "data_update", &key(POST_INDEX_TAG, 8), &value(8, "carol.near")),
                change(CONTRACT, "data_deletion", &key(POST_INDEX_TAG, 9), &value(9, "dave.near")),
                change(CONTRACT, "data_update", &key(POST_INDEX_TAG, 10), &[0, 1])
            ]
        ]);

        let index = AuthorIndex::scan(&block, CONTRACT);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("alice.near"), Some(42));
        assert_eq!(index.get("bob.near"), None);
    }


    #[test]
    fn later_write_of_the_same_author_wins() {
        let block = block(vec![
            vec![change(CONTRACT, "data_update", &key(POST_INDEX_TAG, 5), &value(5, "alice.near"))],
            vec![change(CONTRACT, "data_update", &key(POST_INDEX_TAG, 6), &value(6, "alice.near"))]
        ]);

        let index = AuthorIndex::scan(&block, CONTRACT);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("alice.near"), Some(6));
    }


    fn arb_unrelated_change() -> impl Strategy<Value = serde_json::Value> {
        let account = prop_oneof![Just(CONTRACT.to_string()), "[a-z]{1,8}\\.near"];
        let kind = prop_oneof![Just("data_update"), Just("data_deletion"), Just("account_update")];
        let tag = any::<u8>();
        (account, kind, tag, any::<u64>(), "[a-z]{1,12}")
            .prop_filter("must not address the post namespace", |(account, kind, tag, _, _)| {
                !(account == CONTRACT && *kind == "data_update" && *tag == POST_INDEX_TAG)
            })
            .prop_map(|(account, kind, tag, id, author)| {
                change(&account, kind, &key(tag, id), &value(id, &author))
            })
    }


    proptest! {
        #[test]
        fn unrelated_changes_are_excluded(changes in prop::collection::vec(arb_unrelated_change(), 0..20)) {
            let index = AuthorIndex::scan(&block(vec![changes]), CONTRACT);
            prop_assert!(index.is_empty());
        }
    }
}
