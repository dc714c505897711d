pub mod decoder;
pub mod exporter;
pub mod job_runner;

pub use decoder::decode_file;
pub use exporter::export;
pub use job_runner::{format_coverage, JobReport, JobRunner};
