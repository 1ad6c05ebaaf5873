// Utils

pub mod common;
pub mod dates;
pub mod prometheus_metrics;

pub use dates::{parse_document_date, sortable_timestamp};
