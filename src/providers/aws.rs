//! AWS VPC adapter built on `aws ec2`.

use super::{creation_stamp, parse_json, quote, subnet_name, tolerate_missing};
use super::{CommandRunner, NetworkProvider};
use crate::config::Settings;
use crate::error::{ProvisionError, Result};
use crate::models::{Cloud, Ipv4, NetworkHandle, NetworkRecord};
use serde::Deserialize;
use std::rc::Rc;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct CreateVpcOutput {
    vpc: Vpc,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Vpc {
    vpc_id: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct CreateSubnetOutput {
    subnet: Subnet,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeSubnetsOutput {
    #[serde(default)]
    subnets: Vec<Subnet>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Subnet {
    subnet_id: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeRouteTablesOutput {
    #[serde(default)]
    route_tables: Vec<RouteTable>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct RouteTable {
    route_table_id: String,
    #[serde(default)]
    associations: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeNetworkAclsOutput {
    #[serde(default)]
    network_acls: Vec<NetworkAcl>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct NetworkAcl {
    network_acl_id: String,
    #[serde(default)]
    is_default: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DescribeSecurityGroupsOutput {
    #[serde(default)]
    security_groups: Vec<SecurityGroup>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SecurityGroup {
    group_id: String,
    group_name: String,
}

pub struct AwsProvider {
    runner: Rc<dyn CommandRunner>,
    profile: Option<String>,
}

impl AwsProvider {
    pub fn new(runner: Rc<dyn CommandRunner>, settings: &Settings) -> Self {
        Self {
            runner,
            profile: settings.aws_profile.clone(),
        }
    }

    fn ec2(&self, region: &str, args: &str) -> Result<String> {
        let profile = self
            .profile
            .as_deref()
            .map(|p| format!(" --profile {}", quote(p)))
            .unwrap_or_default();
        self.runner.run(&format!(
            "aws ec2 {args} --region {region}{profile} --output json"
        ))
    }

    fn vpc_filter(vpc_id: &str) -> String {
        format!("--filters Name=vpc-id,Values={vpc_id}")
    }

    fn main_route_table(&self, region: &str, vpc_id: &str) -> Result<Option<String>> {
        let out = self.ec2(
            region,
            &format!(
                "describe-route-tables {} Name=association.main,Values=true",
                Self::vpc_filter(vpc_id)
            ),
        )?;
        let parsed: DescribeRouteTablesOutput = parse_json(&out, "describe-route-tables")?;
        Ok(parsed.route_tables.into_iter().next().map(|rt| rt.route_table_id))
    }

    fn create_subnets(
        &self,
        record: &NetworkRecord,
        vpc_id: &str,
        subnets: &[Ipv4],
    ) -> Result<()> {
        let stamp = creation_stamp();
        for (i, block) in subnets.iter().enumerate() {
            let name = subnet_name(&record.name, i, &stamp);
            let tags = quote(&format!(
                "ResourceType=subnet,Tags=[{{Key=Name,Value={name}}}]"
            ));
            let out = self.ec2(
                &record.region,
                &format!(
                    "create-subnet --vpc-id {vpc_id} --cidr-block {block} --tag-specifications {tags}"
                ),
            )?;
            let created: CreateSubnetOutput = parse_json(&out, "create-subnet")?;
            log::info!(
                "aws subnet {} {block} created in {vpc_id}",
                created.subnet.subnet_id
            );
        }
        Ok(())
    }

    fn delete_subnets(&self, region: &str, vpc_id: &str) -> Result<()> {
        let out = self.ec2(
            region,
            &format!("describe-subnets {}", Self::vpc_filter(vpc_id)),
        )?;
        let parsed: DescribeSubnetsOutput = parse_json(&out, "describe-subnets")?;
        for subnet in parsed.subnets {
            let id = subnet.subnet_id;
            tolerate_missing(
                self.ec2(region, &format!("delete-subnet --subnet-id {id}")),
                &id,
            )?;
        }
        Ok(())
    }

    /// Route tables without associations; the main table always has one and is kept.
    fn delete_route_tables(&self, region: &str, vpc_id: &str, main: Option<&str>) -> Result<()> {
        let out = self.ec2(
            region,
            &format!("describe-route-tables {}", Self::vpc_filter(vpc_id)),
        )?;
        let parsed: DescribeRouteTablesOutput = parse_json(&out, "describe-route-tables")?;
        for rt in parsed.route_tables {
            if !rt.associations.is_empty() || main == Some(rt.route_table_id.as_str()) {
                log::debug!("keeping route table {}", rt.route_table_id);
                continue;
            }
            let id = rt.route_table_id;
            tolerate_missing(
                self.ec2(region, &format!("delete-route-table --route-table-id {id}")),
                &id,
            )?;
        }
        Ok(())
    }

    fn delete_network_acls(&self, region: &str, vpc_id: &str) -> Result<()> {
        let out = self.ec2(
            region,
            &format!("describe-network-acls {}", Self::vpc_filter(vpc_id)),
        )?;
        let parsed: DescribeNetworkAclsOutput = parse_json(&out, "describe-network-acls")?;
        for acl in parsed.network_acls.into_iter().filter(|a| !a.is_default) {
            let id = acl.network_acl_id;
            tolerate_missing(
                self.ec2(region, &format!("delete-network-acl --network-acl-id {id}")),
                &id,
            )?;
        }
        Ok(())
    }

    fn delete_security_groups(&self, region: &str, vpc_id: &str) -> Result<()> {
        let out = self.ec2(
            region,
            &format!("describe-security-groups {}", Self::vpc_filter(vpc_id)),
        )?;
        let parsed: DescribeSecurityGroupsOutput = parse_json(&out, "describe-security-groups")?;
        for sg in parsed
            .security_groups
            .into_iter()
            .filter(|sg| sg.group_name != "default")
        {
            let id = sg.group_id;
            tolerate_missing(
                self.ec2(region, &format!("delete-security-group --group-id {id}")),
                &id,
            )?;
        }
        Ok(())
    }
}

impl NetworkProvider for AwsProvider {
    fn cloud(&self) -> Cloud {
        Cloud::Aws
    }

    fn create_network(&self, record: &NetworkRecord, subnets: &[Ipv4]) -> Result<NetworkHandle> {
        let cidr = record.base_cidr()?.network();
        let tags = quote(&format!(
            "ResourceType=vpc,Tags=[{{Key=Name,Value={}}}]",
            record.name
        ));
        let out = self.ec2(
            &record.region,
            &format!("create-vpc --cidr-block {cidr} --tag-specifications {tags}"),
        )?;
        let vpc_id = parse_json::<CreateVpcOutput>(&out, "create-vpc")?.vpc.vpc_id;
        log::info!("aws vpc {vpc_id} ({cidr}) created for '{}'", record.name);

        let mut handle = NetworkHandle::new(vpc_id.clone());
        let mut finish = || -> Result<()> {
            self.ec2(&record.region, &format!("wait vpc-available --vpc-ids {vpc_id}"))?;
            handle.route_table_id = self.main_route_table(&record.region, &vpc_id)?;
            self.create_subnets(record, &vpc_id, subnets)
        };
        match finish() {
            Ok(()) => Ok(handle),
            Err(e) => Err(ProvisionError::PartiallyCreated {
                handle,
                source: Box::new(e),
            }),
        }
    }

    fn delete_network(&self, record: &NetworkRecord) -> Result<()> {
        let Some(vpc_id) = record.network_id.as_deref() else {
            return Ok(());
        };
        let region = record.region.as_str();

        self.delete_subnets(region, vpc_id)?;
        self.delete_route_tables(region, vpc_id, record.route_table_id.as_deref())?;
        self.delete_network_acls(region, vpc_id)?;
        self.delete_security_groups(region, vpc_id)?;

        tolerate_missing(
            self.ec2(region, &format!("delete-vpc --vpc-id {vpc_id}")),
            vpc_id,
        )?;
        log::info!("aws vpc {vpc_id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{record, ScriptedRunner};
    use super::*;
    use crate::processing::partition;

    const CREATE_VPC: &str = r#"{"Vpc": {"VpcId": "vpc-0abc", "CidrBlock": "10.0.0.0/16", "State": "pending"}}"#;
    const MAIN_RT: &str = r#"{"RouteTables": [{"RouteTableId": "rtb-main", "Associations": [{"Main": true}]}]}"#;
    const CREATE_SUBNET: &str = r#"{"Subnet": {"SubnetId": "subnet-1"}}"#;

    fn provider(runner: &Rc<ScriptedRunner>) -> AwsProvider {
        AwsProvider::new(runner.clone(), &Settings::default())
    }

    #[test]
    fn test_create_vpc_with_two_subnets() {
        let runner = Rc::new(
            ScriptedRunner::new()
                .reply("create-vpc", CREATE_VPC)
                .reply("association.main", MAIN_RT)
                .reply("create-subnet", CREATE_SUBNET),
        );
        let r = record(Cloud::Aws, "core", "10.0.0.0/16", 2);
        let blocks = partition(r.base_cidr().unwrap(), 2).unwrap();

        let handle = provider(&runner).create_network(&r, &blocks).unwrap();
        assert_eq!(handle.network_id, "vpc-0abc");
        assert_eq!(handle.route_table_id.as_deref(), Some("rtb-main"));

        let subnet_calls = runner.calls_matching("create-subnet");
        assert_eq!(subnet_calls.len(), 2);
        assert!(subnet_calls[0].contains("--cidr-block 10.0.0.0/24"));
        assert!(subnet_calls[1].contains("--cidr-block 10.0.1.0/24"));
        assert!(subnet_calls[0].contains("--region us-east-1"));

        let wait = runner.position("wait vpc-available").unwrap();
        assert!(wait < runner.position("create-subnet").unwrap());
    }

    #[test]
    fn test_subnet_failure_reports_partial_create() {
        let runner = Rc::new(
            ScriptedRunner::new()
                .reply("create-vpc", CREATE_VPC)
                .reply("association.main", MAIN_RT)
                .fail(
                    "create-subnet",
                    "An error occurred (InvalidSubnet.Conflict) when calling the CreateSubnet operation",
                ),
        );
        let r = record(Cloud::Aws, "core", "10.0.0.0/16", 1);
        let blocks = partition(r.base_cidr().unwrap(), 1).unwrap();

        match provider(&runner).create_network(&r, &blocks) {
            Err(ProvisionError::PartiallyCreated { handle, .. }) => {
                assert_eq!(handle.network_id, "vpc-0abc");
                assert_eq!(handle.route_table_id.as_deref(), Some("rtb-main"));
            }
            other => panic!("expected partial create, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_order_and_defaults_kept() {
        let runner = Rc::new(
            ScriptedRunner::new()
                .reply(
                    "describe-subnets",
                    r#"{"Subnets": [{"SubnetId": "subnet-1"}, {"SubnetId": "subnet-2"}]}"#,
                )
                .reply(
                    "describe-route-tables",
                    r#"{"RouteTables": [
                        {"RouteTableId": "rtb-main", "Associations": [{"Main": true}]},
                        {"RouteTableId": "rtb-extra", "Associations": []}
                    ]}"#,
                )
                .reply(
                    "describe-network-acls",
                    r#"{"NetworkAcls": [
                        {"NetworkAclId": "acl-default", "IsDefault": true},
                        {"NetworkAclId": "acl-custom", "IsDefault": false}
                    ]}"#,
                )
                .reply(
                    "describe-security-groups",
                    r#"{"SecurityGroups": [
                        {"GroupId": "sg-default", "GroupName": "default"},
                        {"GroupId": "sg-web", "GroupName": "web"}
                    ]}"#,
                ),
        );
        let mut r = record(Cloud::Aws, "core", "10.0.0.0/16", 2);
        r.network_id = Some("vpc-0abc".to_string());
        r.route_table_id = Some("rtb-main".to_string());

        provider(&runner).delete_network(&r).unwrap();

        assert_eq!(runner.calls_matching("delete-subnet ").len(), 2);
        assert_eq!(
            runner.calls_matching("delete-route-table"),
            vec!["aws ec2 delete-route-table --route-table-id rtb-extra --region us-east-1 --output json"]
        );
        assert_eq!(runner.calls_matching("delete-network-acl").len(), 1);
        assert!(runner.calls_matching("acl-default").is_empty());
        assert_eq!(runner.calls_matching("delete-security-group").len(), 1);
        assert!(runner.calls_matching("sg-default").is_empty());

        let vpc = runner.position("delete-vpc").unwrap();
        let calls = runner.calls();
        let last_subnet = calls
            .iter()
            .rposition(|c| c.contains("delete-subnet "))
            .unwrap();
        assert!(last_subnet < vpc);
        assert_eq!(vpc, calls.len() - 1);
    }

    #[test]
    fn test_delete_missing_vpc_is_success() {
        let runner = Rc::new(
            ScriptedRunner::new()
                .reply("describe-subnets", r#"{"Subnets": []}"#)
                .reply("describe-route-tables", r#"{"RouteTables": []}"#)
                .reply("describe-network-acls", r#"{"NetworkAcls": []}"#)
                .reply("describe-security-groups", r#"{"SecurityGroups": []}"#)
                .fail(
                    "delete-vpc",
                    "An error occurred (InvalidVpcID.NotFound) when calling the DeleteVpc operation",
                ),
        );
        let mut r = record(Cloud::Aws, "core", "10.0.0.0/16", 2);
        r.network_id = Some("vpc-gone".to_string());
        assert!(provider(&runner).delete_network(&r).is_ok());
    }

    #[test]
    fn test_profile_is_passed() {
        let runner = Rc::new(ScriptedRunner::new().reply("describe", r#"{}"#));
        let settings = Settings {
            aws_profile: Some("ops".to_string()),
            ..Settings::default()
        };
        let aws = AwsProvider::new(runner.clone(), &settings);
        let mut r = record(Cloud::Aws, "core", "10.0.0.0/16", 0);
        r.network_id = Some("vpc-1".to_string());
        aws.delete_network(&r).unwrap();
        assert!(runner.calls().iter().all(|c| c.contains("--profile 'ops'")));
    }
}
