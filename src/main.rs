use anyhow::Result;
use tempograph::cli::{parse_args, Commands};
use tempograph::errors::{EXIT_ERROR, EXIT_OK};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = parse_args();

    let level = match &cli.command {
        Commands::Analyze(args) => args.log_level(),
        Commands::Init { .. } => 1,
    };
    init_logging(level);

    let code = match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}

fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Analyze(args) => tempograph::commands::handle_analyze(args),
        Commands::Init { force } => {
            let dir = std::env::current_dir()?;
            let path = tempograph::commands::init_config(&dir, force)?;
            println!("Created {}", path.display());
            Ok(EXIT_OK)
        }
    }
}

/// `RUST_LOG` wins; otherwise 0 = errors only, 1 = warnings, 2 = info, 3 = debug, 4+ = trace.
fn init_logging(level: u8) {
    let default = match level {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
