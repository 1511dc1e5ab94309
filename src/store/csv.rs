//! CSV backed record store.

use crate::error::{ProvisionError, Result};
use crate::models::NetworkRecord;
use crate::processing::PassReport;
use std::io;
use std::path::{Path, PathBuf};

/// Columns every inventory file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &["cloud", "name", "region", "cidr", "num_subnets"];

/// Header written back on save, in order.
pub const COLUMNS: &[&str] = &[
    "cloud",
    "name",
    "region",
    "cidr",
    "num_subnets",
    "resource_group",
    "project_id",
    "network_id",
    "route_table_id",
];

/// Network inventory loaded from, and saved back to, one CSV file.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<NetworkRecord>,
}

impl RecordStore {
    pub fn load(path: impl AsRef<Path>) -> Result<RecordStore> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            ProvisionError::Config(format!("Cannot open {}: {e}", path.display()))
        })?;
        let records = read_records(file)?;
        log::info!("Loaded {} record(s) from {}", records.len(), path.display());
        Ok(RecordStore {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn records(&self) -> &[NetworkRecord] {
        &self.records
    }

    /// Merge the identifier changes of a finished pass.
    pub fn apply(&mut self, report: &PassReport) {
        report.apply_to(&mut self.records);
    }

    /// Write all records back to the original path.
    ///
    /// The file is written next to the target and renamed over it, so an
    /// interrupted save leaves the previous state intact.
    pub fn save(&self) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = std::fs::File::create(&tmp)
            .map_err(ProvisionError::from)
            .and_then(|file| write_records(&self.records, file))
            .and_then(|()| std::fs::rename(&tmp, &self.path).map_err(ProvisionError::from));
        if let Err(e) = written {
            if let Err(rm) = std::fs::remove_file(&tmp) {
                log::debug!("Cannot remove {}: {rm}", tmp.display());
            }
            return Err(e);
        }
        log::info!(
            "Saved {} record(s) to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Parse inventory rows. A missing required column fails the whole load.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<NetworkRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(ProvisionError::Config(format!(
                "Missing required column '{column}'"
            )));
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: NetworkRecord = result?;
        records.push(record);
    }
    Ok(records)
}

pub fn write_records<W: io::Write>(records: &[NetworkRecord], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
