use anyhow::Result;
use clap::Parser;
use proxy_pulse::{
    init_logger, CheckerConfig, ProbeCoordinator, ProxyParser, ProxyRecord, ProxyTable,
    DEFAULT_TEST_URL,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};

/// Check which proxies accept HTTP and SOCKS5 traffic
#[derive(Parser)]
#[command(name = "proxy-pulse")]
#[command(about = "Check which proxies accept HTTP and SOCKS5 traffic")]
struct Cli {
    /// Path to txt file containing proxies
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Space-separated proxy list
    #[arg(short, long, num_args = 1..)]
    proxies: Vec<String>,

    /// URL to test proxy connectivity
    #[arg(long)]
    url: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Timeout for each probe in seconds
    #[arg(long, default_value = "5")]
    timeout: u64,

    /// Maximum number of probes in flight
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,

    /// Print the table without colors
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn target_url(&self) -> &str {
        match &self.url {
            Some(url) => {
                debug!("using URL from args: '{}'", url);
                url
            }
            None => {
                debug!("using default URL: '{}'", DEFAULT_TEST_URL);
                DEFAULT_TEST_URL
            }
        }
    }

    fn load_proxies(&self) -> Vec<ProxyRecord> {
        let parser = ProxyParser::new();
        let mut proxies: Vec<ProxyRecord> = self
            .proxies
            .iter()
            .flat_map(|arg| parser.parse_string(arg))
            .collect();

        if let Some(path) = &self.file {
            match parser.parse_file(path) {
                Ok(parsed) => {
                    info!("loaded {} proxies from {:?}", parsed.len(), path);
                    proxies.extend(parsed);
                }
                Err(e) => error!("{}", e),
            }
        }

        proxies
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.debug);

    let mut proxies = cli.load_proxies();
    let target_url = cli.target_url();

    let mut config = CheckerConfig::new().with_timeout(Duration::from_secs(cli.timeout));
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }

    let coordinator = ProbeCoordinator::with_config(config);
    let summary = coordinator.run(&mut proxies, target_url).await;
    info!(
        "finished {} probes: {} available, {} proxies skipped",
        summary.probes, summary.available, summary.skipped
    );

    ProxyTable::new()
        .with_color(!cli.no_color)
        .display(&proxies)?;

    Ok(())
}
