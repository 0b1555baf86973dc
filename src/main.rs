mod cli;
mod error;
mod graph;
mod map;
mod route;
mod route_search;
mod seq;

use clap::{crate_version, App, Arg};
use std::io;

fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));
    let matches = App::new("National Road Map")
        .version(crate_version!())
        .about("Maintains a national road map and answers route queries")
        .arg(
            Arg::with_name("input")
                .takes_value(true)
                .required(false)
                .index(1)
                .help("Command file (default: stdin)"),
        )
        .get_matches();

    let stdout = io::stdout();
    let stderr = io::stderr();

    match matches.value_of("input") {
        Some(path) => {
            log::info!("reading commands from {}", path);
            let file = io::BufReader::new(std::fs::File::open(path)?);
            cli::run(file, stdout.lock(), stderr.lock());
        }
        None => {
            log::info!("reading commands from stdin");
            let stdin = io::stdin();
            cli::run(stdin.lock(), stdout.lock(), stderr.lock());
        }
    }

    Ok(())
}
