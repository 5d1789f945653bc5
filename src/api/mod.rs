pub mod client;
pub mod partitions;
pub mod query;

#[cfg(test)]
pub mod mock;

pub use client::{HttpRecordSource, QueryOutcome, Record, RecordSource};
pub use partitions::PartitionTable;
pub use query::QueryParams;
