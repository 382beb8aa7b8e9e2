use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use sssp_adapter::{AdapterConfig, PageContext, SsspAdapter};
use std::process;
use tracing::Level;

mod commands;

/// Standardized exit codes for CLI.
/// 0 = OK, 2 = input error, 1 = other.
#[allow(dead_code)]
const EXIT_OK: i32 = 0;
const EXIT_OTHER: i32 = 1;
const EXIT_INPUT: i32 = 2;

#[derive(Parser)]
#[command(name = "ssspx", version, about = "SuperSSP adapter CLI: run bidder operations on captured JSON")]
struct Cli {
    /// Adapter config JSON file (defaults apply when omitted)
    #[arg(long, env = "SSSP_CONFIG")]
    config: Option<String>,

    /// Override the endpoint bid requests are POSTed to
    #[arg(long, env = "SSSP_ENDPOINT_URL")]
    endpoint: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PageArgs {
    /// Page URL sent as site.page
    #[arg(long, default_value = "")]
    page: String,
    /// Page hostname sent as site.domain
    #[arg(long, default_value = "")]
    domain: String,
    /// Viewport width
    #[arg(long, default_value_t = 0)]
    width: u32,
    /// Viewport height
    #[arg(long, default_value_t = 0)]
    height: u32,
}

impl PageArgs {
    fn context(&self) -> PageContext {
        PageContext::new(&self.page, &self.domain, self.width, self.height)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check which bid requests in a batch are valid
    Validate {
        /// Path to bid-request batch JSON (or - for stdin)
        #[arg(default_value = "-")]
        requests: String,
    },
    /// Normalize identity assertions and print the reconciliation code
    Eids {
        /// Path to userIdAsEids JSON (or - for stdin)
        #[arg(default_value = "-")]
        file: String,
    },
    /// Build outbound requests for a bid-request batch
    Build {
        /// Path to bid-request batch JSON (or - for stdin)
        #[arg(default_value = "-")]
        requests: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Interpret a server response against its bid request
    Interpret {
        /// Path to server response JSON
        response: String,
        /// Path to the originating bid request JSON
        request: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Compute user syncs for a set of server responses
    Syncs {
        /// Path to server responses JSON array (or - for stdin)
        #[arg(default_value = "-")]
        responses: String,
        /// Allow iframe syncs
        #[arg(long)]
        iframe: bool,
        /// Allow pixel syncs
        #[arg(long)]
        pixel: bool,
        /// Whether GDPR applies (omit when unknown)
        #[arg(long)]
        gdpr_applies: Option<bool>,
        /// TCF consent string
        #[arg(long, default_value = "")]
        consent: String,
        /// US Privacy string
        #[arg(long)]
        usp_consent: Option<String>,
    },
    /// Print the capability descriptor
    Spec,
}

/// Map error strings to exit codes.
fn exit_code_for(err: &str) -> i32 {
    if err.contains("read ") || err.contains("parse ") || err.contains("config") {
        EXIT_INPUT
    } else {
        EXIT_OTHER
    }
}

fn load_config(cli: &Cli) -> Result<AdapterConfig, String> {
    let base = match &cli.config {
        Some(path) => AdapterConfig::from_file(path).map_err(|e| format!("read config: {e}"))?,
        None => AdapterConfig::default(),
    };
    let mut cfg = base.with_env().map_err(|e| e.to_string())?;
    if let Some(endpoint) = &cli.endpoint {
        cfg.endpoint_url = endpoint.clone();
    }
    cfg.validate().map_err(|e| e.to_string())?;
    Ok(cfg)
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let result = load_config(&cli).and_then(|cfg| {
        let adapter = SsspAdapter::new(cfg);
        match cli.command {
            Commands::Validate { requests } => commands::validate(&adapter, &requests),
            Commands::Eids { file } => commands::eids(&file),
            Commands::Build { requests, page } => {
                commands::build(&adapter, &requests, &page.context())
            }
            Commands::Interpret { response, request, page } => {
                commands::interpret(&adapter, &response, &request, &page.context())
            }
            Commands::Syncs { responses, iframe, pixel, gdpr_applies, consent, usp_consent } => {
                commands::syncs(
                    &adapter,
                    &responses,
                    iframe,
                    pixel,
                    gdpr_applies,
                    &consent,
                    usp_consent.as_deref(),
                )
            }
            Commands::Spec => commands::spec(&adapter),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}
