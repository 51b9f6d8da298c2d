use anyhow::Result;
use aquaterm::{app, config::Args};
use clap::Parser;

fn main() -> Result<()> {
    app::run(Args::parse())
}
