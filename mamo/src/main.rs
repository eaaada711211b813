use clap::Parser;

fn main() -> anyhow::Result<()> {
    mamo::app::run(mamo::app::Args::parse())
}
