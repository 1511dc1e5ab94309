//! Declared network inventory rows.

use super::Ipv4;
use crate::error::{ProvisionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cloud provider owning a network.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cloud {
    #[serde(alias = "AWS")]
    Aws,
    #[serde(alias = "AZURE", alias = "Azure")]
    Azure,
    #[serde(alias = "GCP")]
    Gcp,
}

impl Cloud {
    /// Order in which providers are visited during a pass.
    pub const DISPATCH_ORDER: [Cloud; 3] = [Cloud::Aws, Cloud::Azure, Cloud::Gcp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cloud::Aws => "aws",
            Cloud::Azure => "azure",
            Cloud::Gcp => "gcp",
        }
    }
}

impl fmt::Display for Cloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the network inventory file.
///
/// `network_id` doubles as the idempotency marker: `None` means no live network
/// is believed to exist for the row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkRecord {
    pub cloud: Cloud,
    pub name: String,
    pub region: String,
    /// Base address block, kept as text so one bad row doesn't fail the load.
    pub cidr: String,
    pub num_subnets: u32,
    /// Azure only.
    #[serde(default)]
    pub resource_group: Option<String>,
    /// GCP only.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default, alias = "vpc_id")]
    pub network_id: Option<String>,
    /// AWS main route table of the network.
    #[serde(default)]
    pub route_table_id: Option<String>,
}

impl NetworkRecord {
    pub fn is_provisioned(&self) -> bool {
        self.network_id.is_some()
    }

    /// Provider scoping context: resource group for Azure, project for GCP.
    pub fn project_ref(&self) -> Option<&str> {
        let value = match self.cloud {
            Cloud::Aws => None,
            Cloud::Azure => self.resource_group.as_deref(),
            Cloud::Gcp => self.project_id.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Like [`project_ref`](Self::project_ref) but a missing value is a configuration error.
    pub fn require_project_ref(&self) -> Result<&str> {
        self.project_ref().ok_or_else(|| {
            let column = match self.cloud {
                Cloud::Azure => "resource_group",
                _ => "project_id",
            };
            ProvisionError::Config(format!(
                "{} network '{}' has no {column}",
                self.cloud, self.name
            ))
        })
    }

    pub fn base_cidr(&self) -> Result<Ipv4> {
        Ipv4::new(&self.cidr)
            .map_err(|e| ProvisionError::Config(format!("network '{}': {e}", self.name)))
    }

    /// Clear every provider assigned identifier.
    pub fn clear_ids(&mut self) {
        self.network_id = None;
        self.route_table_id = None;
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.cloud, self.name)
    }
}

/// Identifiers handed back by a provider after a successful create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandle {
    pub network_id: String,
    /// Main route table, AWS only.
    pub route_table_id: Option<String>,
}

impl NetworkHandle {
    pub fn new(network_id: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            route_table_id: None,
        }
    }
}

impl fmt::Display for NetworkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.route_table_id {
            Some(rt) => write!(f, "{} (route table {rt})", self.network_id),
            None => write!(f, "{}", self.network_id),
        }
    }
}
