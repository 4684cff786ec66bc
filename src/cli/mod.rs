use std::path::PathBuf;

use clap::Parser;

use crate::config::HarvestConfig;

#[derive(Parser, Debug)]
#[command(name = "pagecrop")]
#[command(
    about = "Harvest url, title and last-modified time from random pages into a CSV file",
    long_about = None
)]
pub struct Cli {
    /// Whether Chrome should run without a window (true/false, yes/no, 1/0)
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set, value_parser = parse_bool_flag)]
    pub headless: Option<bool>,

    /// Path to a custom Chrome/Chromium binary
    #[arg(long = "binary_location", value_name = "PATH")]
    pub binary_location: Option<PathBuf>,

    /// Number of pages to harvest
    #[arg(short, long)]
    pub count: Option<usize>,

    /// Maximum number of concurrent browser sessions
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Directory the CSV file is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Configuration file (default: ~/.config/pagecrop/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Overlay the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut HarvestConfig) {
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(ref path) = self.binary_location {
            config.binary_location = Some(path.clone());
        }
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(ref dir) = self.output_dir {
            config.output.directory = dir.clone();
        }
    }
}

/// Parse a truthy/falsy word the way shell users expect.
pub fn parse_bool_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        other => Err(format!("invalid truth value: {}", other)),
    }
}
