use crate::types::LineStream;
use async_stream::try_stream;
use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};


pub(crate) fn read_lines<R>(reader: R) -> LineStream
where
    R: AsyncBufRead + Unpin + Send + 'static
{
    try_stream! {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue
            }
            yield line
        }
    }.boxed()
}
