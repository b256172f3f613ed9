use crate::metrics;
use crate::progress::Progress;
use devhub_data::near::Block;
use devhub_data_client::{ingest, DataClient};
use devhub_primitives::{Block as _, BlockHeight, BlockRef};
use devhub_processor::{BlockProcessor, PostSink};
use futures::TryStreamExt;
use std::pin::pin;
use std::time::{Duration, Instant};
use tracing::info;


const REPORT_INTERVAL: Duration = Duration::from_secs(5);


pub struct Sink<S> {
    processor: BlockProcessor<S>,
    progress: Progress,
    last_processed: Option<BlockRef>,
    first_block: BlockHeight,
    last_block: Option<BlockHeight>,
    block_stream_interval: Duration
}


impl<S: PostSink> Sink<S> {
    pub fn new(
        processor: BlockProcessor<S>,
        first_block: BlockHeight,
        last_block: Option<BlockHeight>,
        block_stream_interval: Duration
    ) -> Self {
        Self {
            processor,
            progress: Progress::new(Duration::from_secs(10)),
            last_processed: None,
            first_block,
            last_block,
            block_stream_interval
        }
    }

    pub fn processor(&self) -> &BlockProcessor<S> {
        &self.processor
    }

    /// Indexes blocks one by one until the source is exhausted or the last block is reached.
    ///
    /// Ends with an error only when the source delivered something that is not a block.
    pub async fn r#loop<C: DataClient>(&mut self, source: C) -> anyhow::Result<()> {
        let mut blocks = pin!(ingest::<_, Block>(
            source,
            self.first_block,
            self.last_block,
            self.block_stream_interval
        ));

        let mut last_report = Instant::now();

        while let Some(block) = blocks.try_next().await? {
            let report = self.processor.process(&block).await;
            metrics::report_block(&report);
            if let Some(timestamp) = block.timestamp() {
                metrics::LAST_BLOCK_TIMESTAMP.set((timestamp / 1_000_000) as i64);
            }
            self.last_processed = Some(block.to_ref());

            self.progress.set_current_value(report.block_height);
            if last_report.elapsed() > REPORT_INTERVAL {
                self.report();
                last_report = Instant::now();
            }
        }

        if self.progress.has_news() {
            self.report();
        }

        Ok(())
    }

    fn report(&mut self) {
        let speed = self.progress.speed();
        metrics::PROGRESS.set(speed);

        if let Some(last_block) = self.last_processed.as_ref() {
            info!(
                "last block: {}, progress: {} blocks/sec",
                last_block,
                speed.round()
            );
        }
    }
}
