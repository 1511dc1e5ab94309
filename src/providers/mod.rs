//! Cloud provider adapters.
//!
//! Each cloud implements [`NetworkProvider`] on top of its vendor CLI:
//! - [`aws`] - VPCs through `aws ec2`
//! - [`azure`] - VNets through `az network`
//! - [`gcp`] - VPC networks through `gcloud compute`
//! - [`cli`] - command execution shared by all three

pub mod aws;
pub mod azure;
mod cli;
pub mod gcp;

pub use aws::AwsProvider;
pub use azure::AzureProvider;
pub use cli::{parse_json, quote, run, CommandRunner, ShellRunner};
pub use gcp::GcpProvider;

use crate::config::Settings;
use crate::error::{ProvisionError, Result};
use crate::models::{Cloud, Ipv4, NetworkHandle, NetworkRecord};
use std::collections::HashMap;
use std::rc::Rc;

/// Longest name accepted by all three providers (GCP's RFC 1035 limit).
const MAX_NAME_LEN: usize = 63;

/// Create and delete capability over one provider's network model.
pub trait NetworkProvider {
    fn cloud(&self) -> Cloud;

    /// Create the network, wait until it is available, then one subnet per block.
    ///
    /// Once the network exists, any later failure is returned as
    /// [`ProvisionError::PartiallyCreated`] carrying the network's handle.
    fn create_network(&self, record: &NetworkRecord, subnets: &[Ipv4]) -> Result<NetworkHandle>;

    /// Remove subnets, then secondary resources, then the network.
    ///
    /// A network that is already gone is not an error.
    fn delete_network(&self, record: &NetworkRecord) -> Result<()>;
}

/// The adapters available for a pass, keyed by cloud.
#[derive(Default)]
pub struct Providers {
    adapters: HashMap<Cloud, Box<dyn NetworkProvider>>,
    unavailable: HashMap<Cloud, String>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build all three adapters from settings.
    ///
    /// An adapter whose configuration is incomplete is recorded as unavailable
    /// and every row for that cloud fails before any provider call.
    pub fn from_settings(runner: Rc<dyn CommandRunner>, settings: &Settings) -> Self {
        let mut providers = Providers::new()
            .with(Box::new(AwsProvider::new(runner.clone(), settings)))
            .with(Box::new(GcpProvider::new(runner.clone())));
        match AzureProvider::new(runner, settings) {
            Ok(azure) => providers = providers.with(Box::new(azure)),
            Err(e) => {
                log::warn!("azure provider unavailable: {e}");
                providers = providers.unavailable(Cloud::Azure, e.to_string());
            }
        }
        providers
    }

    pub fn with(mut self, provider: Box<dyn NetworkProvider>) -> Self {
        self.unavailable.remove(&provider.cloud());
        self.adapters.insert(provider.cloud(), provider);
        self
    }

    pub fn unavailable(mut self, cloud: Cloud, reason: impl Into<String>) -> Self {
        self.adapters.remove(&cloud);
        self.unavailable.insert(cloud, reason.into());
        self
    }

    pub fn get(&self, cloud: Cloud) -> Result<&dyn NetworkProvider> {
        if let Some(adapter) = self.adapters.get(&cloud) {
            return Ok(adapter.as_ref());
        }
        let reason = self
            .unavailable
            .get(&cloud)
            .cloned()
            .unwrap_or_else(|| "no adapter registered".to_string());
        Err(ProvisionError::Config(format!("{cloud} provider: {reason}")))
    }
}

/// UTC timestamp shared by all subnets created in one call.
pub fn creation_stamp() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}

/// Subnet name for block `index` of `network`.
///
/// Lowercase letters, digits and dashes only, starting with a letter and
/// capped at 63 characters so every provider accepts it.
pub fn subnet_name(network: &str, index: usize, stamp: &str) -> String {
    let suffix = format!("-subnet-{index}-{stamp}");
    let mut base: String = network
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if !base.starts_with(|c: char| c.is_ascii_lowercase()) {
        base.insert(0, 'n');
    }
    base.truncate(MAX_NAME_LEN.saturating_sub(suffix.len()));
    let base = base.trim_end_matches('-');
    format!("{base}{suffix}")
}

/// Treat a not-found failure as success.
pub(crate) fn tolerate_missing(result: Result<String>, what: &str) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => {
            log::info!("{what} already absent");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(dead_code)]
#[path = "../../tests/common/scripted.rs"]
mod scripted;

#[cfg(test)]
use crate::error::classify_failure;

/// Fixtures for adapter tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub use super::scripted::ScriptedRunner;

    pub fn record(cloud: Cloud, name: &str, cidr: &str, num_subnets: u32) -> NetworkRecord {
        NetworkRecord {
            cloud,
            name: name.to_string(),
            region: match cloud {
                Cloud::Aws => "us-east-1",
                Cloud::Azure => "westeurope",
                Cloud::Gcp => "us-central1",
            }
            .to_string(),
            cidr: cidr.to_string(),
            num_subnets,
            resource_group: (cloud == Cloud::Azure).then(|| "rg-net".to_string()),
            project_id: (cloud == Cloud::Gcp).then(|| "proj-1".to_string()),
            network_id: None,
            route_table_id: None,
        }
    }
}
