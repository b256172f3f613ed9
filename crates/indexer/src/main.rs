mod cli;
mod config;
mod indexer;
mod metrics;
mod progress;
mod server;
mod sink;


use clap::Parser;


fn init_tracing(json_log: bool) {
    use std::io::IsTerminal;

    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV)
            .unwrap_or("info".to_string()),
    );

    if std::io::stdout().is_terminal() && !json_log {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(false)
            .init();
    }
}


fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    init_tracing(args.json_log);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(indexer::run(&args))
}
