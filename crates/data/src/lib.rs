pub mod near;
mod types;


pub use types::*;
