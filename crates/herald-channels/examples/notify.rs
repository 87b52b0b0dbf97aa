#![allow(clippy::doc_markdown, clippy::uninlined_format_args)]
//! Example: send one notification through a channel described in JSON
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=herald_smtp=debug,herald_channels=debug \
//!     cargo run --package herald-channels --example notify -- channel.json "Backup finished"
//! ```
//!
//! where `channel.json` looks like:
//!
//! ```json
//! {
//!   "type": "gmail",
//!   "username": "alerts@gmail.com",
//!   "password": "app-password",
//!   "debug": false,
//!   "mail": {
//!     "recipients": [{"email": "ops@example.com"}],
//!     "subject": "Backup report"
//!   }
//! }
//! ```

use herald_channels::ChannelConfig;
use herald_smtp::Format;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(message)) = (args.next(), args.next()) else {
        eprintln!("usage: notify <channel.json> <message>");
        std::process::exit(2);
    };

    let config = ChannelConfig::from_json(&std::fs::read_to_string(&path)?)?;
    let channel = config.build()?;
    println!("Sending through {}...", channel.name());

    let outcome = channel.send(&message).await?;
    println!("{}", outcome.render(Format::PlainText));

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
