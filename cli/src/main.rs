mod args;
mod commands;
mod error;

use args::parse_args;
use log::{Level, error, log_enabled};
use std::process;

fn main() {
    let args = parse_args();

    if let Err(err) = satledger_core::log::init_logger(args.logdir.as_deref(), &args.log_level) {
        eprintln!("failed initializing the logger: {err}");
        process::exit(1);
    }

    match commands::run(&args) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            // The log filter may silence the binary entirely
            if log_enabled!(Level::Error) {
                error!("{err}");
            } else {
                eprintln!("error: {err}");
            }
            process::exit(1);
        }
    }
}
