//! CloudFront policy updater handler
//!
//! Reads one lifecycle event as JSON on stdin, reconciles the grant against a
//! file-backed policy store, and writes the handler response as JSON to
//! stdout. A non-zero exit reports the invocation as failed to the caller,
//! which owns retries.

use anyhow::Context;
use clap::Parser;
use cloudfront_policy_updater::{FsPolicyStore, GrantSpec, LifecycleEvent, Reconciler};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cloudfront-policy-updater")]
#[command(about = "Idempotently grant CloudFront access in a resource's policy document")]
struct Args {
    /// Directory holding one policy document file per resource
    #[arg(short = 's', long)]
    store_dir: PathBuf,

    /// Grant variant (bucket, key)
    #[arg(short = 'v', long, default_value = "bucket")]
    variant: String,

    /// Invocation time bound in seconds (0 disables the bound)
    #[arg(short = 't', long, default_value = "30")]
    timeout_secs: u64,
}

/// Parse grant variant from CLI string
fn parse_variant(s: &str) -> Result<GrantSpec, String> {
    match s.to_lowercase().as_str() {
        "bucket" | "s3" => Ok(GrantSpec::cloudfront_bucket_access()),
        "key" | "kms" => Ok(GrantSpec::cloudfront_key_access()),
        _ => Err(format!(
            "Invalid variant '{}'. Valid options: bucket, key",
            s
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let spec = parse_variant(&args.variant).map_err(anyhow::Error::msg)?;

    info!("Store directory: {:?}", args.store_dir);
    info!("Variant: {} (sid {})", args.variant, spec.sid);

    let mut reconciler = Reconciler::new(FsPolicyStore::new(&args.store_dir), spec);
    if args.timeout_secs > 0 {
        reconciler = reconciler.with_timeout(Duration::from_secs(args.timeout_secs));
    }

    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("Failed to read lifecycle event from stdin")?;

    let event: LifecycleEvent =
        serde_json::from_str(&raw).context("Failed to parse lifecycle event")?;

    let response = reconciler.reconcile(&event).await?;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
