use clap::{value_parser, Parser};
use devhub_primitives::BlockHeight;
use std::path::PathBuf;
use url::Url;


#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML file with the contract, method allow-list and store settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// URL of the block stream service, or a file:// URL of a JSON lines dump
    #[arg(short, long, value_name = "URL")]
    pub src: Url,

    /// First block to index
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub first_block: BlockHeight,

    /// Last block to index, runs forever when omitted
    #[arg(long, value_name = "N")]
    pub last_block: Option<BlockHeight>,

    /// Hasura GraphQL endpoint
    #[arg(long, value_name = "URL")]
    pub graphql_url: Option<Url>,

    /// Value of the x-hasura-role header
    #[arg(long, value_name = "ROLE")]
    pub hasura_role: Option<String>,

    /// Prefix of the dumps, posts and post_snapshots tables
    #[arg(long, value_name = "PREFIX")]
    pub table_prefix: Option<String>,

    /// Keep records in memory instead of writing them to the store
    #[arg(long)]
    pub dry_run: bool,

    /// Whether the logs should be structured in JSON format
    #[arg(long)]
    pub json_log: bool,

    /// Port to use for built-in prometheus metrics server
    #[arg(long)]
    pub prom_port: Option<u16>,

    // Interval between attempts to stream new blocks in seconds
    #[arg(long, value_parser = value_parser!(u16).range(1..), default_value_t = 5)]
    pub block_stream_interval: u16,
}
