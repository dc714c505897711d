use std::path::PathBuf;

use halftone_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("TIFF encode error: {0}")]
    TiffEncode(#[from] tiff::TiffError),

    #[error("PNG encode error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("Image too large for export: {width}x{height}")]
    ImageTooLarge { width: usize, height: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for JobError {
    fn from(e: serde_yaml::Error) -> Self {
        JobError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for JobError {
    fn from(e: serde_json::Error) -> Self {
        JobError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_engine() {
        let error: JobError = EngineError::Cancelled.into();
        assert_eq!(error.to_string(), "Engine error: processing cancelled");
    }

    #[test]
    fn test_job_error_unknown_preset() {
        let error = JobError::UnknownPreset("glossy".to_string());
        assert_eq!(error.to_string(), "Unknown preset: glossy");
    }

    #[test]
    fn test_job_error_image_too_large() {
        let error = JobError::ImageTooLarge {
            width: 70_000,
            height: 10,
        };
        assert_eq!(error.to_string(), "Image too large for export: 70000x10");
    }

    #[test]
    fn test_job_error_config() {
        let error = JobError::Config("bad field".to_string());
        assert_eq!(error.to_string(), "Config error: bad field");
    }

    #[test]
    fn test_job_error_from_yaml() {
        let yaml_error = serde_yaml::from_str::<u32>("not a number").unwrap_err();
        let error: JobError = yaml_error.into();
        match error {
            JobError::Config(_) => {}
            _ => panic!("Expected Config variant"),
        }
    }

    #[test]
    fn test_job_error_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: JobError = io.into();
        assert_eq!(error.to_string(), "IO error: missing");
    }
}
