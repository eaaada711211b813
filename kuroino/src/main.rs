use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    kuroino::app::run(kuroino::app::Args::parse())
}
