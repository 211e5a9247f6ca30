use clap::Parser;
use isd_loader::cli::{run, Cli};
use isd_loader::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
