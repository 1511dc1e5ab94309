//! Provisioning logic.
//!
//! - [`subnetting`] - carving a base CIDR into /24 subnets
//! - [`reconcile`] - the create/delete pass over all records

mod subnetting;
mod reconcile;

// Re-export public functions
pub use subnetting::{partition, SUBNET_PREFIX};
pub use reconcile::{Direction, Outcome, PassReport, Reconciler, RecordOutcome};
