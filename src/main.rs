use clap::Parser;
use macdrank::cli::{run, Cli};
use macdrank::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);
    run(cli)
}
