use anyhow::{Context, Result};
use chrono::Local;
use env_logger::Builder;
use itertools::Itertools;
use log::LevelFilter;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::Path;

pub fn print_error_chain(err: &anyhow::Error) {
    eprintln!("ERROR: {}", err.chain().join("\n\tCaused by: "));
}

/// Log to stderr with local timestamps.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let s = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
    serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}
