//! Error types for network provisioning.

use crate::models::NetworkHandle;
use thiserror::Error;

/// Errors raised while loading records or reconciling them against a provider.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Missing column, credential or scoping context. Not worth retrying.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capacity error: {cidr} yields {available} /{prefix} block(s), {requested} requested")]
    Capacity {
        cidr: String,
        prefix: u8,
        requested: usize,
        available: u64,
    },

    /// Auth, network or tool launch failure. The row is left untouched so the next run retries it.
    #[error("Provider error: {0}")]
    Transient(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Network {handle} created but subnet provisioning failed: {source}")]
    PartiallyCreated {
        handle: NetworkHandle,
        #[source]
        source: Box<ProvisionError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;

const NOT_FOUND_MARKERS: &[&str] = &[
    ".NotFound",
    "was not found",
    "ResourceNotFound",
    "ResourceGroupNotFound",
    "notFound",
];

const BAD_REQUEST_MARKERS: &[&str] = &[
    "DependencyViolation",
    "InvalidParameter",
    "badRequest",
    "Invalid value",
    "resourceInUseByAnotherResource",
    "InvalidRequestFormat",
];

/// Map the stderr of a failed provider command onto the error taxonomy.
pub fn classify_failure(stderr: &str) -> ProvisionError {
    let message = stderr.trim().to_string();
    if NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m)) {
        ProvisionError::NotFound(message)
    } else if BAD_REQUEST_MARKERS.iter().any(|m| stderr.contains(m)) {
        ProvisionError::BadRequest(message)
    } else {
        ProvisionError::Transient(message)
    }
}

impl ProvisionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProvisionError::NotFound(_))
    }

    /// Config and capacity errors are raised before any provider call is made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProvisionError::Config(_) | ProvisionError::Capacity { .. }
        )
    }
}
