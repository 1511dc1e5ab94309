//! Durable storage of the network inventory.

mod csv;

pub use self::csv::{read_records, write_records, RecordStore, COLUMNS, REQUIRED_COLUMNS};
