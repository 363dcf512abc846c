#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Print the gateway's OpenAPI document as JSON.
//!
//! # Examples
//! ```sh
//! cargo run --manifest-path backend/Cargo.toml --bin openapi-dump -- --output openapi.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use utoipa::OpenApi;

use usergate::ApiDoc;

#[derive(Debug, Clone, Parser)]
#[command(name = "openapi-dump", about = "Write the gateway OpenAPI document as JSON")]
struct CliArgs {
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|err| io::Error::other(format!("failed to serialise OpenAPI: {err}")))?;

    match args.output {
        Some(path) => std::fs::write(path, format!("{json}\n")),
        None => writeln!(io::stdout().lock(), "{json}"),
    }
}
