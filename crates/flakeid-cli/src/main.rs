#![doc = include_str!("../README.md")]

mod cli;

use std::io::{BufWriter, Write};

use clap::Parser;
use cli::{
    config::{CliArgs, CliConfig},
    run::run,
    telemetry::init_logging,
};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_logging();
    let config = CliConfig::try_from(args)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(config, &mut out)?;
    out.flush()?;
    Ok(())
}
