//! Provision and tear down VPCs/VNets and their subnets on AWS, Azure and GCP
//! from a CSV inventory.
//!
//! The `network_id` column is the idempotency marker: create passes only touch
//! rows without one, delete passes only rows with one.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;
pub mod providers;
pub mod store;

use config::Settings;
use error::Result;
use processing::{Direction, PassReport, Reconciler};
use providers::{CommandRunner, Providers};
use std::path::Path;
use std::rc::Rc;
use store::RecordStore;

/// Run one reconciliation pass over the inventory at `path` and save it back.
///
/// The file is rewritten whenever the pass ran, even if some rows failed;
/// the returned report tells which.
pub fn run_pass(
    path: &Path,
    direction: Direction,
    settings: &Settings,
    runner: Rc<dyn CommandRunner>,
) -> Result<PassReport> {
    let mut store = RecordStore::load(path)?;
    let providers = Providers::from_settings(runner, settings);

    let report = Reconciler::new(&providers, settings).run(store.records(), direction);
    store.apply(&report);
    store.save()?;
    Ok(report)
}
