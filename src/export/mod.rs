pub mod csv_export;

pub use csv_export::{BatchLogs, CandidateRecord};
