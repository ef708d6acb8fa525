use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod plugin;

use commands::scan::{ScanFlags, Severity};

#[derive(Parser)]
#[command(name = "docker-scan")]
#[command(about = "A tool to scan container images for vulnerabilities", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a container image for vulnerabilities
    Scan(ScanArgs),

    /// Print the Docker CLI plugin metadata
    #[command(name = "docker-cli-plugin-metadata", hide = true)]
    Metadata,
}

#[derive(Args)]
struct ScanArgs {
    /// Authenticate to the scan provider
    #[arg(long)]
    login: bool,

    /// Provider API token, only valid with --login
    #[arg(long, requires = "login")]
    token: Option<String>,

    /// Display version of the scan plugin and its provider
    #[arg(long)]
    version: bool,

    /// Output scan results in JSON format
    #[arg(long)]
    json: bool,

    /// Dockerfile associated with the image, enables base-image advice
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Exclude base-image vulnerabilities from the report, requires --file
    #[arg(long, requires = "file")]
    exclude_base: bool,

    /// Display the dependency tree before the scan results
    #[arg(long)]
    dependency_tree: bool,

    /// Only report vulnerabilities of the given level or higher
    #[arg(long, value_enum)]
    severity: Option<Severity>,

    /// Name of the image to scan
    image: Option<String>,
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Command::Metadata => {
            println!("{}", plugin::metadata_json()?);
            Ok(0)
        }
        Command::Scan(args) => {
            if args.version {
                commands::version::run().await?;
                return Ok(0);
            }
            if args.login {
                commands::login::run(args.token.as_deref()).await?;
                return Ok(0);
            }

            let image = args
                .image
                .as_deref()
                .context("\"docker scan\" requires exactly 1 argument: the image to scan")?;
            let flags = ScanFlags {
                json: args.json,
                file: args.file.clone(),
                exclude_base: args.exclude_base,
                dependency_tree: args.dependency_tree,
                severity: args.severity,
            };
            commands::scan::run(image, &flags).await
        }
    }
}

#[tokio::main]
async fn main() {
    scan_core::logging::init();

    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err);
            1
        }
    };
    std::process::exit(exit_code);
}
