//! Swiftgate - gateway to Swift-compatible object storage

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use swiftgate_cli::{run_server, GatewayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "swiftgate")]
#[command(about = "HTTP gateway for Swift-compatible object storage")]
#[command(version)]
struct Args {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, env = "SWIFTGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(short = 'H', long, env = "SWIFTGATE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SWIFTGATE_PORT")]
    port: Option<u16>,

    /// Path prefix for all routes
    #[arg(long, env = "SWIFTGATE_API_PREFIX")]
    api_prefix: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, env = "SWIFTGATE_BACKEND_TIMEOUT")]
    backend_timeout: Option<u64>,

    /// Requests per second allowed per project
    #[arg(long, env = "SWIFTGATE_RATE_LIMIT")]
    rate_limit: Option<u32>,

    /// Seconds the active configuration may be cached (0 disables)
    #[arg(long, env = "SWIFTGATE_CONFIG_CACHE_TTL")]
    config_cache_ttl: Option<u64>,

    /// JSON file with backend configurations to insert at startup
    #[arg(long, env = "SWIFTGATE_SEED_FILE")]
    seed_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "SWIFTGATE_DEBUG")]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long, env = "SWIFTGATE_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn apply(self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(prefix) = self.api_prefix {
            config.api_prefix = prefix;
        }
        if let Some(timeout) = self.backend_timeout {
            config.backend_timeout_secs = timeout;
        }
        if let Some(rps) = self.rate_limit {
            config.rate_limit_rps = rps;
        }
        if let Some(ttl) = self.config_cache_ttl {
            config.config_cache_ttl_secs = ttl;
        }
        if let Some(seed_file) = self.seed_file {
            config.seed_file = Some(seed_file);
        }
        config
    }
}

/// Directives used when `RUST_LOG` is unset
fn default_log_filter(level: &str) -> String {
    format!(
        "swiftgate_cli={level},swiftgate_client={level},swiftgate_core={level},tower_http=debug"
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_log_filter(log_level).into());
    let (plain, json) = if args.log_json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();

    let file_config = GatewayConfig::load(args.config.as_deref())
        .context("failed to load gateway configuration")?;
    let config = args.apply(file_config);

    tracing::info!("Starting Swiftgate on {}", config.bind_addr());
    tracing::info!(
        "Backend timeout {}s, rate limit {} req/s per project",
        config.backend_timeout_secs,
        config.rate_limit_rps
    );
    if !config.cors_enabled {
        tracing::info!("CORS disabled");
    }

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_covers_every_crate() {
        let filter = default_log_filter("info");
        for target in ["swiftgate_cli=info", "swiftgate_client=info", "swiftgate_core=info"] {
            assert!(filter.contains(target), "{} missing from {}", target, filter);
        }
        assert!(tracing_subscriber::EnvFilter::try_new(&filter).is_ok());
    }
}
