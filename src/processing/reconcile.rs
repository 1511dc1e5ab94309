//! Per-record create/delete reconciliation.
//!
//! A pass visits AWS rows, then Azure, then GCP, each in file order. Rows are
//! never mutated during the pass; the returned [`PassReport`] is merged into
//! the records afterwards with [`PassReport::apply_to`].

use super::partition;
use crate::config::Settings;
use crate::error::{ProvisionError, Result};
use crate::models::{Cloud, NetworkHandle, NetworkRecord};
use crate::providers::Providers;
use std::fmt;
use std::time::Duration;

/// Which way a pass drives the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Create,
    Delete,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Create => write!(f, "create"),
            Direction::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Created(NetworkHandle),
    Deleted,
    /// Nothing to do in this direction.
    Skipped,
    Failed(ProvisionError),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct RecordOutcome {
    /// Position of the record in the store.
    pub index: usize,
    pub label: String,
    pub outcome: Outcome,
}

/// Everything that happened during one pass.
#[derive(Debug)]
pub struct PassReport {
    pub direction: Direction,
    pub outcomes: Vec<RecordOutcome>,
}

impl PassReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            outcomes: Vec::new(),
        }
    }

    pub fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Write identifier changes back into `records`.
    ///
    /// A partially created network still gets its id recorded, so the next
    /// run sees it and a delete pass can remove it.
    pub fn apply_to(&self, records: &mut [NetworkRecord]) {
        for o in &self.outcomes {
            let Some(record) = records.get_mut(o.index) else {
                log::error!("outcome for missing record #{} ({})", o.index, o.label);
                continue;
            };
            match &o.outcome {
                Outcome::Created(handle)
                | Outcome::Failed(ProvisionError::PartiallyCreated { handle, .. }) => {
                    record.network_id = Some(handle.network_id.clone());
                    record.route_table_id = handle.route_table_id.clone();
                }
                Outcome::Deleted => record.clear_ids(),
                Outcome::Skipped | Outcome::Failed(_) => {}
            }
        }
    }
}

/// Drives every record of a store through the matching provider adapter.
pub struct Reconciler<'a> {
    providers: &'a Providers,
    pause: Duration,
}

impl<'a> Reconciler<'a> {
    pub fn new(providers: &'a Providers, settings: &Settings) -> Self {
        Self {
            providers,
            pause: settings.pause,
        }
    }

    pub fn run(&self, records: &[NetworkRecord], direction: Direction) -> PassReport {
        log::info!("#Start {direction} pass over {} record(s)", records.len());
        let mut report = PassReport::new(direction);

        for cloud in Cloud::DISPATCH_ORDER {
            let rows: Vec<(usize, &NetworkRecord)> = records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.cloud == cloud)
                .collect();
            if rows.is_empty() {
                continue;
            }
            if let Err(e) = self.providers.get(cloud) {
                log::error!("{cloud}: {e}; {} record(s) will fail", rows.len());
            }

            for (index, record) in rows {
                let outcome = match direction {
                    Direction::Create => self.create(record),
                    Direction::Delete => self.delete(record),
                };
                log_outcome(record, &outcome);
                let reached_provider = !matches!(outcome, Outcome::Skipped)
                    && !matches!(&outcome, Outcome::Failed(e) if e.is_configuration());
                report.outcomes.push(RecordOutcome {
                    index,
                    label: record.label(),
                    outcome,
                });
                if reached_provider && !self.pause.is_zero() {
                    std::thread::sleep(self.pause);
                }
            }
        }

        log::info!(
            "#End {direction} pass: {} created, {} deleted, {} skipped, {} failed",
            report.count(|o| matches!(o, Outcome::Created(_))),
            report.count(|o| matches!(o, Outcome::Deleted)),
            report.count(|o| matches!(o, Outcome::Skipped)),
            report.failed()
        );
        report
    }

    fn create(&self, record: &NetworkRecord) -> Outcome {
        if record.is_provisioned() {
            return Outcome::Skipped;
        }
        match self.try_create(record) {
            Ok(handle) => Outcome::Created(handle),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Everything that can be checked locally is checked before the provider is called.
    fn try_create(&self, record: &NetworkRecord) -> Result<NetworkHandle> {
        let blocks = partition(record.base_cidr()?, record.num_subnets as usize)?;
        if record.cloud != Cloud::Aws {
            record.require_project_ref()?;
        }
        let provider = self.providers.get(record.cloud)?;
        provider.create_network(record, &blocks)
    }

    fn delete(&self, record: &NetworkRecord) -> Outcome {
        if !record.is_provisioned() {
            return Outcome::Skipped;
        }
        // Adapters decide which missing resources count as already deleted.
        match self.try_delete(record) {
            Ok(()) => Outcome::Deleted,
            Err(e) => Outcome::Failed(e),
        }
    }

    fn try_delete(&self, record: &NetworkRecord) -> Result<()> {
        if record.cloud != Cloud::Aws {
            record.require_project_ref()?;
        }
        self.providers.get(record.cloud)?.delete_network(record)
    }
}

fn log_outcome(record: &NetworkRecord, outcome: &Outcome) {
    let label = record.label();
    match outcome {
        Outcome::Created(handle) => log::info!("{label}: created {handle}"),
        Outcome::Deleted => log::info!("{label}: deleted"),
        Outcome::Skipped => log::debug!("{label}: skipped"),
        Outcome::Failed(e) => log::error!("{label}: {e}"),
    }
}
