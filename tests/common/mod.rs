//! Shared helpers for integration tests.
#![allow(dead_code)]

use multi_cloud_network::error::{classify_failure, Result};
use multi_cloud_network::providers::CommandRunner;
use std::path::{Path, PathBuf};

mod scripted;

pub use scripted::ScriptedRunner;

/// A runner that knows the happy path of all three providers.
pub fn cloud_runner() -> ScriptedRunner {
    ScriptedRunner::new()
        // aws
        .reply(
            "create-vpc",
            r#"{"Vpc": {"VpcId": "vpc-0abc", "CidrBlock": "10.0.0.0/16"}}"#,
        )
        .reply(
            "association.main",
            r#"{"RouteTables": [{"RouteTableId": "rtb-main", "Associations": [{"Main": true}]}]}"#,
        )
        .reply("create-subnet", r#"{"Subnet": {"SubnetId": "subnet-1"}}"#)
        .reply("describe-subnets", r#"{"Subnets": [{"SubnetId": "subnet-1"}]}"#)
        .reply(
            "describe-route-tables",
            r#"{"RouteTables": [{"RouteTableId": "rtb-main", "Associations": [{"Main": true}]}]}"#,
        )
        .reply("describe-network-acls", r#"{"NetworkAcls": []}"#)
        .reply("describe-security-groups", r#"{"SecurityGroups": []}"#)
        // azure
        .reply(
            "vnet subnet create",
            r#"{"id": "/subscriptions/sub-1/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/hub/subnets/s"}"#,
        )
        .reply(
            "vnet create",
            r#"{"newVNet": {"id": "/subscriptions/sub-1/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/hub"}}"#,
        )
        // gcp
        .reply("networks subnets create", "[]")
        .reply("networks create", r#"[{"id": "8812345", "name": "edge"}]"#)
        .reply("regions list", r#"[{"name": "us-central1"}]"#)
        .reply(
            "subnets list",
            r#"[{"name": "edge-subnet-0-x", "network": "https://www.googleapis.com/compute/v1/projects/proj-1/global/networks/edge"}]"#,
        )
}

/// Copy a fixture into a temp dir so the test can rewrite it.
pub fn fixture_copy(dir: &Path, fixture: &str) -> PathBuf {
    let src = Path::new("src/tests/test_data").join(fixture);
    let dst = dir.join(fixture);
    std::fs::copy(&src, &dst).expect("Error copying fixture");
    dst
}
