//! File logging. The terminal belongs to the UI, so nothing goes to stdout.

use core::fmt::Arguments;
use std::path::Path;
use std::time::SystemTime;

use log::{LevelFilter, Record};

pub fn init(path: &Path, level: LevelFilter) -> Result<(), fern::InitError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    fern::Dispatch::new()
        .format(file_format)
        .level(LevelFilter::Warn)
        .level_for("dexview", level)
        .chain(fern::log_file(path)?)
        .apply()?;

    Ok(())
}

fn file_format(callback: fern::FormatCallback, message: &Arguments, record: &Record) {
    callback.finish(format_args!(
        "{} {:<5} {} {}",
        humantime::format_rfc3339_millis(SystemTime::now()),
        record.level(),
        record.target(),
        message,
    ))
}
