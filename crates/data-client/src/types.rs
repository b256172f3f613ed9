use devhub_primitives::BlockHeight;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde::Serialize;
use std::fmt::Debug;


/// Stream of raw JSON lines, one block per line
pub type LineStream = BoxStream<'static, anyhow::Result<String>>;


#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
pub struct BlockRange {
    pub from: BlockHeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<BlockHeight>
}


pub trait DataClient: Debug + Send + Sync {
    fn stream(&self, range: BlockRange) -> BoxFuture<'_, anyhow::Result<LineStream>>;

    /// Whether the source may get new blocks after the current stream ends
    fn is_live(&self) -> bool {
        true
    }
}


impl<C: DataClient + ?Sized> DataClient for Box<C> {
    fn stream(&self, range: BlockRange) -> BoxFuture<'_, anyhow::Result<LineStream>> {
        self.as_ref().stream(range)
    }

    fn is_live(&self) -> bool {
        self.as_ref().is_live()
    }
}
