mod commands;

use clap::{Parser, Subcommand};
use lexis_core::export::DEFAULT_REPORT_NAME;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexis", about = "Linguistic analysis over a hosted language model")]
struct Cli {
    /// Config file (default: ~/.lexis/config.toml)
    #[arg(long, global = true, env = "LEXIS_CONFIG")]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create ~/.lexis/config.toml with defaults
    Init,
    /// Run the analysis provider over HTTP
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Submit text or a file to a running provider and show the result
    Analyze {
        /// Text to analyze
        text: Option<String>,
        /// File to attach (.txt, .md, .pdf, ...)
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Read text from stdin
        #[arg(long, conflicts_with = "text")]
        stdin: bool,
        /// Ground the analysis with web search and fact-check claims
        #[arg(long)]
        search: bool,
        /// Provider URL (overrides client.endpoint)
        #[arg(long)]
        endpoint: Option<String>,
        /// Write the JSON report to this path (bare flag: ./analysis_report.json)
        #[arg(long, short, num_args = 0..=1, default_missing_value = DEFAULT_REPORT_NAME)]
        output: Option<PathBuf>,
        /// Print the JSON report instead of the summary view
        #[arg(long)]
        json: bool,
    },
    /// Check whether a provider is up and has a model credential
    Check {
        /// Provider URL (overrides client.endpoint)
        #[arg(long)]
        endpoint: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "lexis=debug,lexis_core=debug,tower_http=debug"
    } else {
        "lexis=info,lexis_core=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone();
    let result = match cli.command {
        Commands::Init => commands::init::run(config_path),
        Commands::Serve { bind } => commands::serve::run(config_path, bind).await,
        Commands::Analyze {
            text,
            file,
            stdin,
            search,
            endpoint,
            output,
            json,
        } => {
            let args = commands::analyze::AnalyzeArgs {
                text,
                file,
                stdin,
                search,
                endpoint,
                output,
                json,
            };
            commands::analyze::run(config_path, args).await
        }
        Commands::Check { endpoint } => commands::check::run(config_path, endpoint).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
