//! Runtime settings read from the environment (and `.env` via dotenv).

use crate::error::{ProvisionError, Result};
use std::time::Duration;

/// Default log4rs configuration file.
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

pub const ENV_AZURE_SUBSCRIPTION: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_AWS_PROFILE: &str = "AWS_PROFILE";
pub const ENV_PAUSE_MSEC: &str = "MCN_PAUSE_MSEC";

/// Provider credentials context and pacing for a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Required by the Azure adapter.
    pub azure_subscription_id: Option<String>,
    pub aws_profile: Option<String>,
    /// Sleep after every record that reached a provider.
    pub pause: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Settings> {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let pause = match non_empty(ENV_PAUSE_MSEC) {
            Some(raw) => {
                let msec: u64 = raw.parse().map_err(|_| {
                    ProvisionError::Config(format!("{ENV_PAUSE_MSEC}='{raw}' is not a number"))
                })?;
                Duration::from_millis(msec)
            }
            None => Duration::ZERO,
        };

        Ok(Settings {
            azure_subscription_id: non_empty(ENV_AZURE_SUBSCRIPTION),
            aws_profile: non_empty(ENV_AWS_PROFILE),
            pause,
        })
    }
}
