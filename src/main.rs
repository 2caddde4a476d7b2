use ajax_dispatch::cli::run_cli;
use ajax_dispatch::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::from_env())?;
    run_cli()
}
