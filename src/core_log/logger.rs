use chrono::Local;
use colored::*;
use env_logger::{Builder, Env};
use log::Level;
use std::io::Write;

fn colored_level(level: Level) -> ColoredString {
    match level {
        Level::Error => level.to_string().red(),
        Level::Warn => level.to_string().yellow(),
        Level::Info => level.to_string().green(),
        Level::Debug => level.to_string().blue(),
        Level::Trace => level.to_string().white(),
    }
}

/// Initializes the logger with a custom format and colors. `RUST_LOG` wins
/// over the default filter.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                colored_level(record.level()),
                record.args()
            )
        })
        .init();
}
