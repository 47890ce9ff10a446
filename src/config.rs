//! Runtime configuration from command line flags and environment

use std::path::PathBuf;

use log::LevelFilter;

use crate::api::DEFAULT_API_BASE;
use crate::query::{is_valid_page_size, QueryState, DEFAULT_PAGE_SIZE, PAGE_SIZES};

#[derive(clap::Args, Debug, Clone)]
pub struct Config {
    /// Root URL of the Pokedex API
    #[arg(long, env = "DEXVIEW_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Initial page size (10, 20, 50 or 100)
    #[arg(long, env = "DEXVIEW_LIMIT", default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub limit: u32,

    /// Open the detail screen for this id on start
    #[arg(long)]
    pub id: Option<u32>,

    /// Write logs to this file (logging is off without it)
    #[arg(long, env = "DEXVIEW_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for the log file
    #[arg(long, env = "DEXVIEW_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl Config {
    pub fn initial_query(&self) -> QueryState {
        QueryState::with_limit(self.limit)
    }
}

fn parse_page_size(value: &str) -> Result<u32, String> {
    let limit: u32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !is_valid_page_size(limit) {
        return Err(format!("page size must be one of {PAGE_SIZES:?}"));
    }
    Ok(limit)
}
