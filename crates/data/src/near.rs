use crate::types::{decode_base64, Base64String, JsonValue};
use devhub_primitives::{AccountId, BlockHeight};
use serde::Deserialize;


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub height: BlockHeight,
    pub hash: String,
    pub prev_hash: String,
    #[serde(default)]
    pub timestamp: Option<u64>
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub header: BlockHeader,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub shards: Vec<Shard>
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub receipt_id: String,
    pub signer_id: AccountId,
    pub receiver_id: AccountId,
    #[serde(default)]
    pub operations: Vec<ActionOperation>
}


#[derive(Deserialize, Debug, Clone)]
pub enum ActionOperation {
    FunctionCall(FunctionCall),
    #[serde(untagged)]
    Other(JsonValue)
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    #[serde(alias = "method_name")]
    pub method_name: String,
    /// Base64 encoded call arguments, decoded lazily by the consumer
    #[serde(default)]
    pub args: Base64String
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    #[serde(default)]
    pub state_changes: Vec<StateChange>
}


#[derive(Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateChangeType {
    DataUpdate,
    DataDeletion,
    #[serde(other)]
    Other
}


#[derive(Deserialize, Debug, Clone)]
pub struct StateChange {
    #[serde(rename = "type")]
    pub r#type: StateChangeType,
    pub change: StateChangeValue
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StateChangeValue {
    pub account_id: AccountId,
    #[serde(default)]
    pub key_base64: Option<Base64String>,
    #[serde(default)]
    pub value_base64: Option<Base64String>
}


impl StateChangeValue {
    pub fn key_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.key_base64.as_deref().map(decode_base64)
    }

    pub fn value_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.value_base64.as_deref().map(decode_base64)
    }
}


impl Block {
    pub fn state_changes(&self) -> impl Iterator<Item = &StateChange> {
        self.shards.iter().flat_map(|shard| shard.state_changes.iter())
    }
}


impl devhub_primitives::Block for Block {
    fn height(&self) -> BlockHeight {
        self.header.height
    }

    fn hash(&self) -> &str {
        &self.header.hash
    }

    fn parent_hash(&self) -> &str {
        &self.header.prev_hash
    }

    fn timestamp(&self) -> Option<u64> {
        self.header.timestamp
    }
}
