mod mutation;
mod response;
mod sink;


pub use mutation::*;
pub use response::*;
pub use sink::*;
