use crate::types::{BlockRange, DataClient};
use anyhow::Context;
use async_stream::try_stream;
use devhub_primitives::{Block, BlockHeight};
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{info, warn};


const BACKOFF_MS: [u64; 8] = [0, 100, 200, 500, 1000, 2000, 5000, 10000];


/// Streams blocks starting from `from` in height order.
///
/// Transport errors never end the stream: the request is repeated with backoff
/// from the first block that was not delivered yet. Blocks below that height
/// are skipped, so each block is yielded at least once and never out of order.
/// A block that fails to parse is a fatal error.
pub fn ingest<C, B>(
    client: C,
    from: BlockHeight,
    to: Option<BlockHeight>,
    poll_interval: Duration
) -> impl Stream<Item = anyhow::Result<B>>
where
    C: DataClient,
    B: Block + DeserializeOwned
{
    try_stream! {
        let mut next_block = from;
        let mut error_counter = 0;

        while to.map_or(true, |last_block| next_block <= last_block) {
            let range = BlockRange {
                from: next_block,
                to
            };

            let mut lines = match client.stream(range).await {
                Ok(lines) => lines,
                Err(err) => {
                    backoff(&client, &mut error_counter, err).await;
                    continue
                }
            };

            let mut stream_is_empty = true;
            let mut stream_failed = false;

            while let Some(line_result) = lines.next().await {
                let line = match line_result {
                    Ok(line) => line,
                    Err(err) => {
                        backoff(&client, &mut error_counter, err).await;
                        stream_failed = true;
                        break
                    }
                };

                let block: B = serde_json::from_str(&line).with_context(|| {
                    format!("failed to parse a block following #{}", next_block.saturating_sub(1))
                })?;

                if block.height() < next_block {
                    continue
                }

                if to.map_or(false, |last_block| block.height() > last_block) {
                    break
                }

                error_counter = 0;
                stream_is_empty = false;
                next_block = block.height() + 1;
                yield block
            }

            // an interrupted pass says nothing about whether the source has more blocks
            if stream_is_empty && !stream_failed {
                if !client.is_live() {
                    break
                }
                info!(
                    "no blocks were found. waiting {} sec for a new try",
                    poll_interval.as_secs()
                );
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}


async fn backoff<C: DataClient>(client: &C, error_counter: &mut usize, error: anyhow::Error) {
    let pause = BACKOFF_MS[std::cmp::min(*error_counter, BACKOFF_MS.len() - 1)];
    warn!(
        error =? error,
        data_source =? client,
        "data ingestion error, will retry in {} ms",
        pause
    );
    *error_counter += 1;
    if pause > 0 {
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }
}
