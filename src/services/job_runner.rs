use std::path::{Path, PathBuf};

use halftone_engine::{
    CancelToken, Channel, ChannelSet, HalftoneEngine, ProcessingResult, RasterImage, Stage,
};

use crate::error::JobError;
use crate::models::JobConfig;
use crate::services::{decoder, exporter};

/// Summary of a finished job.
#[derive(Debug, Clone)]
pub struct JobReport {
    /// Written files, separations in channel order and the preview last
    pub files: Vec<PathBuf>,
    pub width: usize,
    pub height: usize,
    /// Share of pixels inked per channel
    pub coverage: ChannelSet<f64>,
}

/// Decode → separate/screen → export, for one configuration.
///
/// The engine is built (and validated) once, so a runner can process many
/// files with the same settings.
pub struct JobRunner {
    config: JobConfig,
    engine: HalftoneEngine,
}

impl JobRunner {
    pub fn new(config: JobConfig) -> Result<Self, JobError> {
        let engine = config.engine()?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Process `input` and write the results into `output_dir`.
    ///
    /// `name` defaults to the input file stem.
    pub fn run(
        &self,
        input: &Path,
        output_dir: &Path,
        name: Option<&str>,
    ) -> Result<JobReport, JobError> {
        self.run_with(input, output_dir, name, &CancelToken::new())
    }

    /// [`run`](Self::run) with cancellation. Nothing is written when the job
    /// is cancelled before export starts.
    pub fn run_with(
        &self,
        input: &Path,
        output_dir: &Path,
        name: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<JobReport, JobError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => default_name(input),
        };

        let image = decoder::decode_file(input, self.config.source_dpi)?;
        let result = self.process(&image, cancel)?;
        let files = exporter::export(&result, output_dir, &name, self.config.compression)?;

        Ok(JobReport {
            files,
            width: result.width(),
            height: result.height(),
            coverage: ChannelSet::from_fn(|c| result.plane(c).coverage()),
        })
    }

    /// Run the engine on an already decoded image.
    pub fn process(
        &self,
        image: &RasterImage,
        cancel: &CancelToken,
    ) -> Result<ProcessingResult, JobError> {
        let result = self.engine.process_with(image, cancel, &|stage| match stage {
            Stage::Screening(channel) => tracing::debug!(%channel, "Screening"),
            other => tracing::debug!(stage = ?other, "Stage"),
        })?;
        Ok(result)
    }
}

fn default_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output")
        .to_string()
}

/// Human-readable coverage line, e.g. `C 12.5% M 40.0% ...`.
pub fn format_coverage(coverage: &ChannelSet<f64>) -> String {
    Channel::ALL
        .iter()
        .map(|&c| {
            let initial = match c {
                Channel::Cyan => "C",
                Channel::Magenta => "M",
                Channel::Yellow => "Y",
                Channel::Black => "K",
                Channel::White => "W",
            };
            format!("{initial} {:.1}%", coverage[c] * 100.0)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
