mod commands;
mod monitor;
mod terminal;

use commands::{CommandLine, discover, watch};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.log_level());
    print::initialize();

    let cfg = commands.radar_config();
    commands::privilege_notice();

    if commands.once {
        print::header("single sweep", commands.quiet);
        discover::discover(cfg, commands.quiet).await
    } else {
        print::header("watching the network", commands.quiet);
        watch::watch(cfg, commands.quiet).await
    }
}
