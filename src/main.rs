use clap::Parser;
use routekit::cli::{run_cli, Cli};
use routekit::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(level) = &cli.log_level {
        log_config.log_level = level.clone();
    }
    init_logging_with_config(&log_config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_cli(&cli, &mut out)
}
