//! tome CLI
//!
//! Interactive console interface for a personal book collection.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use tome_core::{Config, Store};

mod output;
mod session;

use session::Session;

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never interleave with the menu
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let (store, outcome) = Store::open_with_config(config);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut session = Session::new(store, stdin.lock(), stdout.lock());
    session.report_load(&outcome)?;
    session.run()
}
