//! Sitewalk CLI: resolve sitemaps, discover site pages, inspect robots.txt.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use sitewalk_runtime::cli::{self, output, resolve_cmd::ResolveSource, site_cmd::SiteOptions};
use sitewalk_runtime::config::RuntimeConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitewalk")]
#[command(about = "Recursive sitemap resolution and crawl-target discovery")]
#[command(version)]
struct Cli {
    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show extra detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Per-request fetch timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum simultaneous fetches
    #[arg(long, global = true)]
    max_fetches: Option<usize>,

    /// Abandon in-flight sibling fetches after the first failure
    #[arg(long, global = true)]
    cancel_on_failure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a sitemap into the full list of page URLs
    Resolve {
        /// Sitemap URL
        url: Option<String>,

        /// Read the root sitemap from a local file instead
        #[arg(short, long, conflicts_with = "url")]
        file: Option<PathBuf>,
    },

    /// Find a site's sitemaps via robots.txt and resolve them
    Discover {
        /// Site base URL
        base_url: String,

        /// Drop URLs robots.txt disallows for this user agent
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Discover the pages of a configured site
    Site {
        /// Site config name (file stem under the sites directory)
        name: String,

        /// Drop URLs robots.txt disallows for this user agent
        #[arg(short, long)]
        agent: Option<String>,

        /// Directory holding site configs
        #[arg(long)]
        sites_dir: Option<PathBuf>,

        /// Fetch discovered pages and extract products with the site's selectors
        #[arg(short, long)]
        extract: bool,

        /// Extract from at most this many pages
        #[arg(long, requires = "extract")]
        limit: Option<usize>,
    },

    /// Show robots.txt rules from a URL or local file
    Robots {
        /// robots.txt URL or path
        source: String,

        /// Only show the rules that apply to this user agent
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Sanitize an HTML file (`-` reads stdin)
    Sanitize {
        /// HTML file path
        path: String,
    },

    /// Serve the resolution API over HTTP
    Serve {
        /// Listen address
        #[arg(long, default_value = sitewalk_runtime::server::DEFAULT_ADDR)]
        addr: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    export_output_flags(&cli);
    init_tracing(&cli);

    let mut config = RuntimeConfig::from_env()?;
    if let Some(secs) = cli.timeout {
        config.http.timeout = Duration::from_secs(secs);
    }
    if let Some(max) = cli.max_fetches {
        config.resolve.max_concurrent_fetches = max;
    }
    if cli.cancel_on_failure {
        config.resolve.cancel_on_failure = true;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(cli.command, config))
}

async fn run(command: Commands, mut config: RuntimeConfig) -> Result<()> {
    match command {
        Commands::Resolve { url, file } => {
            let source = match (url, file) {
                (Some(url), None) => ResolveSource::Url(url),
                (None, Some(path)) => ResolveSource::File(path),
                _ => bail!("pass either a sitemap URL or --file <path>"),
            };
            cli::resolve_cmd::run(source, &config).await
        }
        Commands::Discover { base_url, agent } => {
            cli::discover_cmd::run(&base_url, agent.as_deref(), &config).await
        }
        Commands::Site {
            name,
            agent,
            sites_dir,
            extract,
            limit,
        } => {
            if let Some(dir) = sites_dir {
                config.sites_dir = dir;
            }
            let options = SiteOptions {
                agent,
                extract,
                limit,
            };
            cli::site_cmd::run(&name, &options, &config).await
        }
        Commands::Robots { source, agent } => {
            cli::robots_cmd::run(&source, agent.as_deref(), &config).await
        }
        Commands::Sanitize { path } => cli::sanitize_cmd::run(&path),
        Commands::Serve { addr } => cli::serve_cmd::run(&addr, &config).await,
    }
}

/// Export global output flags so subcommands can read them via `cli::output`.
/// Runs before the async runtime starts any threads.
fn export_output_flags(cli: &Cli) {
    let flags = [
        (cli.json, output::ENV_JSON),
        (cli.quiet, output::ENV_QUIET),
        (cli.verbose, output::ENV_VERBOSE),
        (cli.no_color, output::ENV_NO_COLOR),
    ];
    for (enabled, key) in flags {
        if enabled {
            std::env::set_var(key, "1");
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_directive = if cli.verbose {
        "sitewalk=debug,sitewalk_runtime=debug"
    } else if cli.quiet {
        "sitewalk=warn,sitewalk_runtime=warn"
    } else {
        "sitewalk=info,sitewalk_runtime=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.with_ansi(output::color_enabled()).init();
    }
}
