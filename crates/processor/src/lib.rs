mod args;
mod correlate;
mod filter;
mod gateway;
mod memory;
mod model;
mod processor;
mod state;


pub use args::*;
pub use correlate::*;
pub use filter::*;
pub use gateway::*;
pub use memory::MemorySink;
pub use model::*;
pub use processor::*;
pub use state::*;
