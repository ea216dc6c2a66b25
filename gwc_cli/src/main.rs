//! Write Gjesdal's waste collection calendar to a file, or inspect it first.

mod cli;

use anyhow::Result;
use clap::Parser;

use crate::cli::Arguments;

fn main() -> Result<()> {
    env_logger::init();
    let arguments = Arguments::parse();
    cli::run(arguments)
}
