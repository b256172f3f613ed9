use std::fmt::{Display, Formatter};


pub type BlockHeight = u64;
pub type PostId = u64;
pub type AccountId = String;


#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct BlockRef {
    pub height: BlockHeight,
    pub hash: String
}


impl Display for BlockRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.height, self.hash)
    }
}


pub trait Block {
    fn height(&self) -> BlockHeight;

    fn hash(&self) -> &str;

    fn parent_hash(&self) -> &str;

    /// Block time in nanoseconds since the Unix epoch
    fn timestamp(&self) -> Option<u64> {
        None
    }

    fn to_ref(&self) -> BlockRef {
        BlockRef {
            height: self.height(),
            hash: self.hash().to_string()
        }
    }
}
