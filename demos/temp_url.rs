//! Issue a Swift temp URL from the command line
//!
//! ```text
//! cargo run --example temp_url -- <storage-url> <tenant> <key> <container> <object> [ttl] [method]
//! ```

use anyhow::{bail, Context};
use std::sync::Arc;
use swiftgate_core::{ConfigResolver, MemoryConfigStore, NewBackendConfig, SignedUrlIssuer, TempUrlMethod};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 5 {
        bail!("usage: temp_url <storage-url> <tenant> <key> <container> <object> [ttl-seconds] [method]");
    }

    let ttl: u64 = match args.get(5) {
        Some(raw) => raw.parse().context("ttl must be a number of seconds")?,
        None => 3600,
    };
    let method: TempUrlMethod = match args.get(6) {
        Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
        None => TempUrlMethod::Get,
    };

    let resolver = ConfigResolver::new(Arc::new(MemoryConfigStore::new()));
    resolver
        .create(NewBackendConfig::new("cli", &args[0], &args[1]).with_temp_url_key(&args[2]))
        .await?;

    let config = resolver.resolve_active().await?;
    let grant = SignedUrlIssuer::new().issue(&config, &args[3], &args[4], ttl, method)?;

    let output = serde_json::json!({
        "url": grant.url,
        "method": grant.method,
        "expires": grant.expires,
        "expiresAt": grant.expires_at().map(|t| t.to_rfc3339()),
        "issuedAt": chrono::Utc::now().to_rfc3339(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
