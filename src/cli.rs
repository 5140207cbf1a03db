use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// netview: live network dashboard for the terminal
#[derive(Parser, Debug)]
#[command(name = "netview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: $HOME/.config/netview/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/netview.log")]
    pub log_file: PathBuf,

    /// Maximum number of processes to rank (0 for no limit)
    #[arg(short = 'n', long, value_name = "N")]
    pub process_limit: Option<usize>,

    /// Interface sampling interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Do not look up the external IP address
    #[arg(long)]
    pub no_external_ip: bool,

    /// URL returning the external IP as plain text
    #[arg(long, value_name = "URL")]
    pub external_ip_url: Option<String>,
}

impl Cli {
    /// Overlays the flags that were given on top of `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(limit) = self.process_limit {
            config.display.process_limit = limit;
        }
        if let Some(ms) = self.interval_ms {
            config.refresh.network_interval_ms = ms;
        }
        if self.no_external_ip {
            config.external_ip.enabled = false;
        }
        if let Some(url) = &self.external_ip_url {
            config.external_ip.url = url.clone();
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
