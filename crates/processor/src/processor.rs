use crate::correlate::{correlate, CorrelationMiss, Resolution, WritePlan};
use crate::filter::{extract_operations, Contract};
use crate::gateway::{PersistenceError, PersistenceGateway, PostSink};
use crate::state::AuthorIndex;
use devhub_data::near::Block;
use devhub_primitives::{BlockHeight, PostId};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tracing::{debug, instrument, warn};


#[derive(Debug)]
pub enum OperationOutcome {
    Persisted {
        post_id: PostId,
        post_created: bool
    },
    Dropped(CorrelationMiss),
    Failed(PersistenceError)
}


#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct BlockReport {
    pub block_height: BlockHeight,
    pub operations: usize,
    pub decode_failures: usize,
    pub persisted: usize,
    pub posts_created: usize,
    pub dropped: usize,
    pub failed: usize
}


impl BlockReport {
    fn new(block_height: BlockHeight) -> Self {
        Self {
            block_height,
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &OperationOutcome) {
        match outcome {
            OperationOutcome::Persisted { post_created, .. } => {
                self.persisted += 1;
                if *post_created {
                    self.posts_created += 1;
                }
            },
            OperationOutcome::Dropped(_) => self.dropped += 1,
            OperationOutcome::Failed(_) => self.failed += 1
        }
    }
}


pub struct BlockProcessor<S> {
    contract: Contract,
    gateway: PersistenceGateway<S>
}


impl<S: PostSink> BlockProcessor<S> {
    pub fn new(contract: Contract, sink: S) -> Self {
        Self {
            contract,
            gateway: PersistenceGateway::new(sink)
        }
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Indexes all relevant calls of the block.
    ///
    /// Write chains of different operations run concurrently and fail
    /// independently, the method returns once all of them settled.
    #[instrument(name = "block", skip_all, fields(height = block.header.height))]
    pub async fn process(&self, block: &Block) -> BlockReport {
        let block_height = block.header.height;
        let mut report = BlockReport::new(block_height);

        let mut operations = Vec::new();
        for result in extract_operations(block, &self.contract) {
            match result {
                Ok(op) => operations.push(op),
                Err(err) => {
                    warn!(error = %err, receipt_id = %err.receipt_id, "dropping a call with undecodable arguments");
                    report.decode_failures += 1;
                }
            }
        }

        report.operations = operations.len();

        if operations.is_empty() {
            return report
        }

        let index = AuthorIndex::scan(block, &self.contract.account_id);
        debug!(operations = operations.len(), authors = index.len(), "correlating");

        let mut writes: FuturesUnordered<_> = operations.iter()
            .map(|op| correlate(op, &index, block_height))
            .map(|plan| self.execute(plan))
            .collect();

        while let Some(outcome) = writes.next().await {
            report.record(&outcome);
        }

        report
    }

    async fn execute(&self, plan: WritePlan) -> OperationOutcome {
        if let Err(err) = self.gateway.upsert_dump(&plan.dump).await {
            return OperationOutcome::Failed(err)
        }

        let (post, snapshot) = match plan.resolution {
            Resolution::Dropped(miss) => {
                warn!(
                    method = %miss.method,
                    receipt_id = %miss.receipt_id,
                    block_height = miss.block_height,
                    signer_id = %miss.signer_id,
                    "receipt doesn't result in a state change, it's probably a failed receipt"
                );
                return OperationOutcome::Dropped(miss)
            },
            Resolution::Resolved { post, snapshot } => (post, snapshot)
        };

        let post_created = post.is_some();
        if let Some(post) = post {
            if let Err(err) = self.gateway.upsert_post(&post).await {
                return OperationOutcome::Failed(err)
            }
        }

        if let Err(err) = self.gateway.upsert_post_snapshot(&snapshot).await {
            return OperationOutcome::Failed(err)
        }

        OperationOutcome::Persisted {
            post_id: snapshot.post_id,
            post_created
        }
    }
}
