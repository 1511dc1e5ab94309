//! Command line arguments.

use crate::config::DEFAULT_LOG_CONFIG;
use crate::processing::Direction;
use clap::Parser;
use std::path::PathBuf;

/// Create or tear down VPCs/VNets and their subnets listed in a CSV inventory.
#[derive(Parser, Debug)]
#[command(name = "mcn", version, about)]
pub struct Cli {
    /// Inventory CSV, rewritten in place with the resulting network ids
    pub file: PathBuf,

    /// Delete the networks listed instead of creating them
    #[arg(long)]
    pub delete: bool,

    /// log4rs configuration file
    #[arg(long, default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: PathBuf,
}

impl Cli {
    pub fn direction(&self) -> Direction {
        if self.delete {
            Direction::Delete
        } else {
            Direction::Create
        }
    }
}
