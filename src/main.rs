//! tickerlens command-line entry point.

use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    if let Err(e) = tickerlens::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
