//! `app`: serves the system config API.
//!
//! # Startup Flow
//!
//! 1. Parse flags, then layer the config file and `APP_*` variables on top
//! 2. Validate every option group
//! 3. Print the version or env names and exit, when asked to
//! 4. Initialize logging, connect to PostgreSQL and run migrations
//! 5. Serve until ctrl-c or SIGTERM

use clap::Parser;
use systemconfig_server::options::AppOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut opts = AppOptions::parse();
    opts.complete()?;
    opts.validate()?;
    opts.run().await
}
