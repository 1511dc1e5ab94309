//! log4rs initialisation.

use crate::error::{ProvisionError, Result};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:5})} {t} - {m}{n}";

/// Initialise logging from a log4rs YAML file, or a plain console logger at
/// `info` when the file does not exist.
pub fn init_logging(config_file: &Path) -> Result<()> {
    if config_file.exists() {
        log4rs::init_file(config_file, Default::default()).map_err(|e| {
            ProvisionError::Config(format!(
                "Error initializing log4rs from {}: {e}",
                config_file.display()
            ))
        })?;
        log::debug!("logging configured from {}", config_file.display());
        return Ok(());
    }

    log4rs::init_config(console_config(LevelFilter::Info)?)
        .map_err(|e| ProvisionError::Config(format!("Error initializing log4rs: {e}")))?;
    log::debug!(
        "{} not found, logging to console",
        config_file.display()
    );
    Ok(())
}

fn console_config(level: LevelFilter) -> Result<Config> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();
    Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|e| ProvisionError::Config(format!("Invalid log4rs config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_config_builds() {
        assert!(console_config(LevelFilter::Debug).is_ok());
    }
}
