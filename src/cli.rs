use clap::Parser;
use std::path::PathBuf;

use crate::countdown::{parse_countdown_arg, Countdown};

#[derive(Parser, Debug, PartialEq)]
#[command(name = "tickshare")]
#[command(about = "Several countdowns driven by one shared once-per-second clock")]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Clock refresh interval in milliseconds (overrides config)
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Extra countdown as LABEL=EPOCH_SECONDS; may be repeated
    #[arg(long = "countdown", value_name = "LABEL=EPOCH", value_parser = parse_countdown_value)]
    pub countdowns: Vec<Countdown>,
}

fn parse_countdown_value(value: &str) -> Result<Countdown, String> {
    parse_countdown_arg(value).map_err(|e| format!("{:#}", e))
}
