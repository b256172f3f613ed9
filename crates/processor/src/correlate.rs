use crate::args::{Method, PostArgs};
use crate::filter::Operation;
use crate::model::{DumpRecord, Post, PostSnapshot};
use crate::state::AuthorIndex;
use devhub_primitives::{AccountId, BlockHeight};
use std::fmt::{Display, Formatter};
use tracing::warn;


/// Writes derived from a single operation, in the order they must happen
#[derive(Debug, Clone, PartialEq)]
pub struct WritePlan {
    pub dump: DumpRecord,
    pub resolution: Resolution
}


#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No storage write matched the signer
    Dropped(CorrelationMiss),
    Resolved {
        /// Present only for `add_post`
        post: Option<Post>,
        snapshot: PostSnapshot
    }
}


/// The call executed but left no post write behind, most likely a failed receipt
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMiss {
    pub receipt_id: String,
    pub method: Method,
    pub block_height: BlockHeight,
    pub signer_id: AccountId
}


impl Display for CorrelationMiss {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "receipt {} to {} at {} doesn't result in a state change",
            self.receipt_id,
            self.method,
            self.block_height
        )
    }
}


impl std::error::Error for CorrelationMiss {}


pub fn correlate(op: &Operation, index: &AuthorIndex, block_height: BlockHeight) -> WritePlan {
    let post_id = index.get(&op.signer_id);

    let dump = DumpRecord {
        receipt_id: op.receipt_id.clone(),
        method_name: op.method().as_str().to_string(),
        block_height,
        args: op.raw_args.to_string(),
        caller: op.signer_id.clone(),
        post_id
    };

    let Some(post_id) = post_id else {
        return WritePlan {
            dump,
            resolution: Resolution::Dropped(CorrelationMiss {
                receipt_id: op.receipt_id.clone(),
                method: op.method(),
                block_height,
                signer_id: op.signer_id.clone()
            })
        }
    };

    let post = match &op.args {
        PostArgs::AddPost(args) => Some(Post {
            id: post_id,
            parent_id: args.parent_id,
            author_id: op.signer_id.clone()
        }),
        PostArgs::EditPost(args) => {
            if let Some(id) = args.id.filter(|id| *id != post_id) {
                warn!(
                    receipt_id = %op.receipt_id,
                    editor_id = %op.signer_id,
                    args_id = id,
                    post_id,
                    "edit_post id differs from the id of the storage write, using the latter"
                );
            }
            None
        }
    };

    let body = op.args.body();

    let snapshot = PostSnapshot {
        post_id,
        block_height,
        editor_id: op.signer_id.clone(),
        labels: op.args.labels().to_vec(),
        post_type: body.post_type.clone(),
        description: body.description.clone(),
        name: body.name.clone(),
        sponsorship_token: body.sponsorship_token.as_ref().map(|token| token.to_string()),
        sponsorship_amount: body.amount.clone(),
        sponsorship_supervisor: body.supervisor.clone()
    };

    WritePlan {
        dump,
        resolution: Resolution::Resolved {
            post,
            snapshot
        }
    }
}
