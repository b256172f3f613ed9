mod file;
mod http;
mod ingest;
mod lines;
mod types;


pub use file::FileDataClient;
pub use http::{default_http_client, ReqwestDataClient};
pub use ingest::ingest;
pub use types::*;
