//! FastDCA demo - entry point

use std::path::PathBuf;

use anyhow::Context;
use fastdca_config::{AppConfig, ConfigLoader, DEFAULT_ENV_PREFIX};
use fastdca_telemetry::init_logging;
use tracing::info;

enum Command {
    Serve,
    ValidateDemo,
}

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
    /// Path to a `.env` file.
    dotenv: PathBuf,
    command: Command,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut dotenv = PathBuf::from(".env");
        let mut command = Command::Serve;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--env-file" => {
                    if let Some(path) = args.next() {
                        dotenv = PathBuf::from(path);
                    }
                }
                "validate-demo" => command = Command::ValidateDemo,
                "serve" => command = Command::Serve,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("fastdca-demo {}", fastdca_demo::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self {
            config,
            dotenv,
            command,
        }
    }
}

fn print_help() {
    println!(
        r"FastDCA demo - dependency injection and validation examples

USAGE:
    fastdca-demo [OPTIONS] [COMMAND]

COMMANDS:
    serve            Run the HTTP service (default)
    validate-demo    Validate sample users and print the results

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
        --env-file <PATH>  Path to a .env file (default: .env, skipped if missing)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    FASTDCA__SERVER__HTTP_ADDR           Bind address (default: 127.0.0.1:8000)
    FASTDCA__SERVER__REQUEST_TIMEOUT_MS  Per-request timeout (default: 30000)
    FASTDCA__LOGGING__LEVEL              Log filter (default: info)
    FASTDCA__LOGGING__FORMAT             json, pretty or compact (default: json)
    FASTDCA__LOGIN__USERNAME             Username accepted by /signin (default: admin)
    FASTDCA__LOGIN__PASSWORD             Password accepted by /signin (default: admin)

EXAMPLES:
    fastdca-demo --config fastdca.toml
    FASTDCA__SERVER__HTTP_ADDR=0.0.0.0:9000 fastdca-demo
    fastdca-demo validate-demo
"
    );
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader
            .with_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }

    loader
        .with_dotenv(&args.dotenv)?
        .with_env_prefix(DEFAULT_ENV_PREFIX)
        .load()
        .context("invalid configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::ValidateDemo = args.command {
        println!("{}", fastdca_demo::validation_report());
        return Ok(());
    }

    let config = load_config(&args)?;
    init_logging(&config.logging).context("failed to initialise logging")?;

    info!(
        version = fastdca_demo::VERSION,
        http_addr = %config.server.http_addr,
        "starting fastdca demo"
    );

    fastdca_demo::app(&config).run().await?;

    info!("fastdca demo stopped");
    Ok(())
}
