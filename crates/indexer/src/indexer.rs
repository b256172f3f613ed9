use crate::cli::Cli;
use crate::config::IndexerConfig;
use crate::metrics;
use crate::server::run_server;
use crate::sink::Sink;
use anyhow::{anyhow, ensure, Context};
use devhub_data_client::{default_http_client, DataClient, FileDataClient, ReqwestDataClient};
use devhub_hasura::HasuraSink;
use devhub_primitives::BlockHeight;
use devhub_processor::{BlockProcessor, MemorySink};
use prometheus_client::registry::Registry;
use std::time::Duration;
use tracing::{error, info};
use url::Url;


pub async fn run(args: &Cli) -> anyhow::Result<()> {
    ensure!(
        args.first_block <= args.last_block.unwrap_or(BlockHeight::MAX),
        "--first-block is greater than --last-block"
    );

    let config = IndexerConfig::load(args)?;
    let contract = config.contract();
    let source = create_source(&args.src)?;

    if let Some(port) = args.prom_port {
        let mut registry = Registry::default();
        metrics::register_metrics(&mut registry);
        tokio::spawn(async move {
            if let Err(err) = run_server(registry, port).await {
                error!(error =? err, "metrics server terminated");
            }
        });
    }

    info!(
        contract = %contract.account_id,
        methods = ?contract.methods,
        first_block = args.first_block,
        last_block = ?args.last_block,
        dry_run = args.dry_run,
        "starting indexer"
    );

    let block_stream_interval = Duration::from_secs(args.block_stream_interval as u64);

    if args.dry_run {
        let memory = MemorySink::new();
        let processor = BlockProcessor::new(contract, memory.clone());
        Sink::new(processor, args.first_block, args.last_block, block_stream_interval)
            .r#loop(source)
            .await?;

        info!(
            dumps = memory.dumps().len(),
            posts = memory.posts().len(),
            post_snapshots = memory.snapshots().len(),
            "dry run completed"
        );
    } else {
        let hasura = create_hasura_sink(&config)?;
        let processor = BlockProcessor::new(contract, hasura);
        Sink::new(processor, args.first_block, args.last_block, block_stream_interval)
            .r#loop(source)
            .await?;
    }

    Ok(())
}


fn create_source(url: &Url) -> anyhow::Result<Box<dyn DataClient>> {
    if url.scheme() == "file" {
        let path = url.to_file_path().map_err(|_| anyhow!("invalid file url - {}", url))?;
        Ok(Box::new(FileDataClient::new(path)))
    } else {
        let http = default_http_client()?;
        Ok(Box::new(ReqwestDataClient::new(http, url.clone())?))
    }
}


fn create_hasura_sink(config: &IndexerConfig) -> anyhow::Result<HasuraSink> {
    let url = config.hasura.url.clone()
        .context("graphql endpoint is not configured, pass --graphql-url or use --dry-run")?;

    let role = config.hasura.role.clone()
        .context("hasura role is not configured, pass --hasura-role")?;

    let sink = HasuraSink::new(default_http_client()?, url, role, &config.hasura.table_prefix)?;

    Ok(match config.hasura.admin_secret.as_ref() {
        Some(secret) => sink.with_admin_secret(secret),
        None => sink
    })
}
