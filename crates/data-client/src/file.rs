use crate::lines::read_lines;
use crate::types::{BlockRange, DataClient, LineStream};
use anyhow::Context;
use futures::future::BoxFuture;
use std::path::PathBuf;


/// Replays blocks from a local newline delimited JSON file.
///
/// The whole file is returned on every request, blocks below
/// the requested range are filtered by the ingest loop.
#[derive(Debug, Clone)]
pub struct FileDataClient {
    path: PathBuf
}


impl FileDataClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into()
        }
    }

    async fn open(&self) -> anyhow::Result<LineStream> {
        let file = tokio::fs::File::open(&self.path).await.with_context(|| {
            format!("failed to open {}", self.path.display())
        })?;
        Ok(read_lines(tokio::io::BufReader::new(file)))
    }
}


impl DataClient for FileDataClient {
    fn stream(&self, _range: BlockRange) -> BoxFuture<'_, anyhow::Result<LineStream>> {
        Box::pin(self.open())
    }

    fn is_live(&self) -> bool {
        false
    }
}
