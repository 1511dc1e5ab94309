//! GCP VPC network adapter built on `gcloud compute`.
//!
//! Subnets are regional in GCP and there is no call listing the subnets of a
//! single network, so deletion walks every region of the project and keeps the
//! subnets whose `network` link points at the target.

use super::{creation_stamp, parse_json, quote, subnet_name, tolerate_missing};
use super::{CommandRunner, NetworkProvider};
use crate::error::{ProvisionError, Result};
use crate::models::{Cloud, Ipv4, NetworkHandle, NetworkRecord};
use serde::Deserialize;
use std::rc::Rc;

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ResourceId {
    Text(String),
    Number(u64),
}

#[derive(Deserialize, Debug)]
struct ComputeNetwork {
    id: ResourceId,
}

#[derive(Deserialize, Debug)]
struct Region {
    name: String,
}

#[derive(Deserialize, Debug)]
struct ComputeSubnet {
    name: String,
    #[serde(default)]
    network: String,
}

pub struct GcpProvider {
    runner: Rc<dyn CommandRunner>,
}

impl GcpProvider {
    pub fn new(runner: Rc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn compute(&self, project: &str, args: &str) -> Result<String> {
        self.runner.run(&format!(
            "gcloud compute {args} --project {} --format json",
            quote(project)
        ))
    }

    fn create_subnets(&self, record: &NetworkRecord, project: &str, subnets: &[Ipv4]) -> Result<()> {
        let stamp = creation_stamp();
        for (i, block) in subnets.iter().enumerate() {
            let name = subnet_name(&record.name, i, &stamp);
            self.compute(
                project,
                &format!(
                    "networks subnets create {name} --network {} --region {} --range {block}",
                    record.name, record.region
                ),
            )?;
            log::info!("gcp subnet {name} {block} created in {}", record.region);
        }
        Ok(())
    }

    /// Subnets of `network` as `(region, subnet)` pairs across every region of the project.
    fn find_subnets(&self, project: &str, network: &str) -> Result<Vec<(String, String)>> {
        let regions: Vec<Region> =
            parse_json(&self.compute(project, "regions list")?, "regions list")?;
        let suffix = format!("/networks/{network}");

        let mut found = Vec::new();
        for region in regions {
            let out = self.compute(
                project,
                &format!("networks subnets list --regions {}", region.name),
            )?;
            let subnets: Vec<ComputeSubnet> = parse_json(&out, "networks subnets list")?;
            found.extend(
                subnets
                    .into_iter()
                    .filter(|s| s.network.ends_with(&suffix))
                    .map(|s| (region.name.clone(), s.name)),
            );
        }
        log::debug!("gcp network '{network}' has {} subnet(s)", found.len());
        Ok(found)
    }
}

impl NetworkProvider for GcpProvider {
    fn cloud(&self) -> Cloud {
        Cloud::Gcp
    }

    fn create_network(&self, record: &NetworkRecord, subnets: &[Ipv4]) -> Result<NetworkHandle> {
        let project = record.require_project_ref()?;
        let out = self.compute(
            project,
            &format!("networks create {} --subnet-mode custom", record.name),
        )?;
        let network = parse_json::<OneOrMany<ComputeNetwork>>(&out, "networks create")?
            .first()
            .ok_or_else(|| ProvisionError::Json("networks create: empty response".to_string()))?;
        let network_id = match network.id {
            ResourceId::Text(id) => id,
            ResourceId::Number(id) => id.to_string(),
        };
        log::info!("gcp network {network_id} '{}' created in {project}", record.name);

        let handle = NetworkHandle::new(network_id);
        match self.create_subnets(record, project, subnets) {
            Ok(()) => Ok(handle),
            Err(e) => Err(ProvisionError::PartiallyCreated {
                handle,
                source: Box::new(e),
            }),
        }
    }

    fn delete_network(&self, record: &NetworkRecord) -> Result<()> {
        let project = record.require_project_ref()?;
        for (region, subnet) in self.find_subnets(project, &record.name)? {
            tolerate_missing(
                self.compute(
                    project,
                    &format!("networks subnets delete {subnet} --region {region} --quiet"),
                ),
                &subnet,
            )?;
        }
        tolerate_missing(
            self.compute(
                project,
                &format!("networks delete {} --quiet", record.name),
            ),
            &record.name,
        )?;
        log::info!("gcp network '{}' deleted from {project}", record.name);
        Ok(())
    }
}
