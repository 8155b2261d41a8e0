use clap::Parser;
use sta::StaArgs;

fn main() -> anyhow::Result<()> {
    let args = StaArgs::parse();
    sta::sta_main(args)
}
