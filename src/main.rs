use clap::Parser;
use hintstep_lib::cli::{self, Args};
use hintstep_lib::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.json_logs {
        logging::init_logging();
    } else {
        logging::init_logging_pretty();
    }
    cli::run(args).await
}
