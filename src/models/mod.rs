pub mod config;

pub use config::{BlackGeneration, JobConfig, MethodKind, TiffCompression, PRESETS};
