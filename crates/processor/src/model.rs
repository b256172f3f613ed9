use devhub_primitives::{AccountId, BlockHeight, PostId};
use serde::Serialize;


/// Raw record of every indexed call, kept for replay and debugging
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DumpRecord {
    pub receipt_id: String,
    pub method_name: String,
    pub block_height: BlockHeight,
    /// Call arguments as JSON text
    pub args: String,
    pub caller: AccountId,
    pub post_id: Option<PostId>
}


#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub parent_id: Option<PostId>,
    pub author_id: AccountId
}


#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PostSnapshot {
    pub post_id: PostId,
    pub block_height: BlockHeight,
    pub editor_id: AccountId,
    pub labels: Vec<String>,
    pub post_type: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    /// JSON text of the token, whatever shape the contract used
    pub sponsorship_token: Option<String>,
    pub sponsorship_amount: Option<String>,
    pub sponsorship_supervisor: Option<AccountId>
}
