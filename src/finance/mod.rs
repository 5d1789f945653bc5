pub mod fetch;
pub mod ratios;
pub mod summary;
pub mod topics;

pub use fetch::{CommuneFetcher, CommuneReport, FetchOutcome};
pub use topics::{Topic, TopicRow, TopicTable};
