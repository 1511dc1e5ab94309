//! Azure VNet adapter built on `az network`.

use super::{creation_stamp, parse_json, quote, subnet_name, tolerate_missing};
use super::{CommandRunner, NetworkProvider};
use crate::config::{Settings, ENV_AZURE_SUBSCRIPTION};
use crate::error::{ProvisionError, Result};
use crate::models::{Cloud, Ipv4, NetworkHandle, NetworkRecord};
use serde::Deserialize;
use std::rc::Rc;

#[derive(Deserialize, Debug)]
struct VnetCreateOutput {
    #[serde(rename = "newVNet")]
    new_vnet: AzureResource,
}

#[derive(Deserialize, Debug)]
struct AzureResource {
    id: String,
}

pub struct AzureProvider {
    runner: Rc<dyn CommandRunner>,
    subscription_id: String,
}

impl AzureProvider {
    /// Fails when no subscription is configured, before any `az` call is made.
    pub fn new(runner: Rc<dyn CommandRunner>, settings: &Settings) -> Result<Self> {
        let subscription_id = settings
            .azure_subscription_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                ProvisionError::Config(format!("{ENV_AZURE_SUBSCRIPTION} is not set"))
            })?;
        Ok(Self {
            runner,
            subscription_id,
        })
    }

    fn network(&self, resource_group: &str, args: &str) -> Result<String> {
        self.runner.run(&format!(
            "az network {args} --subscription {} --resource-group {} --output json",
            self.subscription_id,
            quote(resource_group)
        ))
    }

    fn create_subnets(
        &self,
        record: &NetworkRecord,
        resource_group: &str,
        subnets: &[Ipv4],
    ) -> Result<()> {
        let stamp = creation_stamp();
        for (i, block) in subnets.iter().enumerate() {
            let name = subnet_name(&record.name, i, &stamp);
            let out = self.network(
                resource_group,
                &format!(
                    "vnet subnet create --vnet-name {} --name {name} --address-prefixes {block}",
                    quote(&record.name)
                ),
            )?;
            let created: AzureResource = parse_json(&out, "vnet subnet create")?;
            log::info!("azure subnet {} {block} created", created.id);
        }
        Ok(())
    }
}

impl NetworkProvider for AzureProvider {
    fn cloud(&self) -> Cloud {
        Cloud::Azure
    }

    fn create_network(&self, record: &NetworkRecord, subnets: &[Ipv4]) -> Result<NetworkHandle> {
        let resource_group = record.require_project_ref()?;
        let cidr = record.base_cidr()?.network();
        // az blocks until the long-running create has finished.
        let out = self.network(
            resource_group,
            &format!(
                "vnet create --name {} --location {} --address-prefixes {cidr}",
                quote(&record.name),
                record.region
            ),
        )?;
        let vnet_id = parse_json::<VnetCreateOutput>(&out, "vnet create")?
            .new_vnet
            .id;
        log::info!("azure vnet {vnet_id} ({cidr}) created");

        let handle = NetworkHandle::new(vnet_id);
        match self.create_subnets(record, resource_group, subnets) {
            Ok(()) => Ok(handle),
            Err(e) => Err(ProvisionError::PartiallyCreated {
                handle,
                source: Box::new(e),
            }),
        }
    }

    /// Deleting the VNet removes its subnets along with it.
    fn delete_network(&self, record: &NetworkRecord) -> Result<()> {
        let resource_group = record.require_project_ref()?;
        tolerate_missing(
            self.network(
                resource_group,
                &format!("vnet delete --name {}", quote(&record.name)),
            ),
            &record.name,
        )?;
        log::info!("azure vnet '{}' deleted from {resource_group}", record.name);
        Ok(())
    }
}
