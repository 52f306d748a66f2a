use anyhow::Result;
use clap::Parser;
use slidecal::cli::{Cli, Commands};

fn main() -> Result<()> {
    slidecal::observability::install_panic_hook();
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match cli.command_or_default() {
        Commands::Calibrate(args) => {
            slidecal::commands::handle_calibrate(args, cli.quiet)
        }
        Commands::Init { force } => slidecal::commands::init::init_config(force),
    }
}

// RUST_LOG takes precedence over -v
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
