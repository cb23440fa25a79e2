//! Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use teamdex_core::StorageConfig;

/// teamdex HTTP/JSON gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "teamdex-gateway")]
#[command(about = "HTTP/JSON gateway for teamdex rosters")]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Directory holding the sled database.
    #[arg(short, long, default_value = "./teamdex_data")]
    pub data_dir: PathBuf,

    /// Use a throwaway database that is removed on exit.
    #[arg(long)]
    pub temporary: bool,

    /// JSON catalog seed loaded at startup.
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// sled page cache size in megabytes.
    #[arg(long, default_value_t = 256)]
    pub cache_mb: u64,

    /// Per-request timeout (ms) enforced at the gateway.
    #[arg(long, default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    /// Number of retries for writes rejected by a concurrent commit.
    #[arg(long, default_value_t = 2)]
    pub write_retries: usize,

    /// Backoff (ms) between write retries.
    #[arg(long, default_value_t = 50)]
    pub write_retry_backoff_ms: u64,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Directory holding the sled database.
    pub data_dir: PathBuf,
    /// Whether the database is temporary.
    pub temporary: bool,
    /// Catalog seed loaded at startup.
    pub seed: Option<PathBuf>,
    /// sled page cache size in bytes.
    pub cache_capacity: u64,
    /// Per-request timeout enforced at the gateway.
    pub request_timeout: Duration,
    /// Number of retries for writes rejected by a concurrent commit.
    pub write_retries: usize,
    /// Backoff between write retries.
    pub write_retry_backoff: Duration,
}

impl GatewayConfig {
    /// Storage settings derived from this configuration.
    pub fn storage_config(&self) -> StorageConfig {
        let config = if self.temporary {
            StorageConfig::temporary()
        } else {
            StorageConfig::new(&self.data_dir)
        };
        config.with_cache_capacity(self.cache_capacity)
    }
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: args.listen.clone(),
            data_dir: args.data_dir.clone(),
            temporary: args.temporary,
            seed: args.seed.clone(),
            cache_capacity: args.cache_mb * 1024 * 1024,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            write_retries: args.write_retries,
            write_retry_backoff: Duration::from_millis(args.write_retry_backoff_ms),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            data_dir: PathBuf::from("./teamdex_data"),
            temporary: false,
            seed: None,
            cache_capacity: 256 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            write_retries: 2,
            write_retry_backoff: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_into_config() {
        let args = Args::parse_from([
            "teamdex-gateway",
            "--temporary",
            "--cache-mb",
            "16",
            "--request-timeout-ms",
            "500",
            "--seed",
            "catalog.json",
        ]);
        let config = GatewayConfig::from(&args);

        assert!(config.temporary);
        assert_eq!(config.cache_capacity, 16 * 1024 * 1024);
        assert_eq!(config.request_timeout, Duration::from_millis(500));
        assert_eq!(config.seed, Some(PathBuf::from("catalog.json")));
        assert_eq!(config.write_retries, 2);
        assert_eq!(args.log_level, "info");
    }
}
