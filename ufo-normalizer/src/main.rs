//! Command line entry point for normalizing a UFO.

use std::io::Write;

use clap::Parser;
use env_logger::Env;
use log::info;

use ufo_normalizer::{args::Args, normalize_ufo, Error};

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level().to_string()))
        .format(|buf, record| {
            let ts = buf.timestamp_micros();
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{}: {:?}: {style}{}{style:#}: {}",
                ts,
                std::thread::current().id(),
                record.level(),
                record.args()
            )
        })
        .init();

    let config = args.config();
    config.init()?;
    config.init_thread_pool();

    let summary = normalize_ufo(&config)?;
    info!(
        "{:?} is normalized, {} of {} files changed",
        config.target(),
        summary.written,
        summary.checked
    );
    Ok(())
}
