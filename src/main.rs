use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dtf_separator::models::{JobConfig, MethodKind, PRESETS};
use dtf_separator::services::{format_coverage, JobRunner};
use halftone_engine::{Channel, DiffusionKernel, DotShape, Noise, Srgb, WhitePolicy};

#[derive(Parser)]
#[command(name = "dtf-separator")]
#[command(about = "CMYK+White separation and halftone screening for DTF printing")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// White underbase mode selectable on the command line (default thresholds).
#[derive(Clone, Copy, ValueEnum)]
enum WhiteMode {
    Full,
    Knockout,
    None,
    Underbase,
    Density,
    EdgeEnhanced,
}

impl From<WhiteMode> for WhitePolicy {
    fn from(mode: WhiteMode) -> Self {
        match mode {
            WhiteMode::Full => WhitePolicy::Full,
            WhiteMode::Knockout => WhitePolicy::Knockout,
            WhiteMode::None => WhitePolicy::None,
            WhiteMode::Underbase => WhitePolicy::underbase(),
            WhiteMode::Density => WhitePolicy::Density,
            WhiteMode::EdgeEnhanced => WhitePolicy::edge_enhanced(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Ordered,
    ErrorDiffusion,
    Stochastic,
    Hybrid,
}

impl From<Method> for MethodKind {
    fn from(method: Method) -> Self {
        match method {
            Method::Ordered => MethodKind::Ordered,
            Method::ErrorDiffusion => MethodKind::ErrorDiffusion,
            Method::Stochastic => MethodKind::Stochastic,
            Method::Hybrid => MethodKind::Hybrid,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Separate and screen an image into DTF films
    Process {
        /// Input image (PNG, JPEG, TIFF, WebP, BMP)
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Base name of the output files (default: input file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Start from a built-in preset
        #[arg(short, long, conflicts_with = "config")]
        preset: Option<String>,

        /// Job config file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output resolution
        #[arg(long)]
        dpi: Option<f64>,

        /// Screen ruling
        #[arg(long)]
        lpi: Option<f64>,

        #[arg(long, value_enum)]
        method: Option<Method>,

        /// Error diffusion kernel (e.g. "atkinson", "stucki")
        #[arg(long)]
        kernel: Option<DiffusionKernel>,

        /// Dot shape for ordered screening: round, diamond or line
        #[arg(long)]
        dot_shape: Option<DotShape>,

        #[arg(long, value_enum)]
        white: Option<WhiteMode>,

        /// Resolution of the input artwork
        #[arg(long)]
        source_dpi: Option<f64>,

        /// Garment colour for the preview as hex RGB (e.g. "#1a1a1a")
        #[arg(long)]
        backdrop: Option<Srgb>,

        /// Threshold jitter amplitude (0.0-0.5); seeded by --seed
        #[arg(long)]
        noise: Option<f32>,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// List the built-in presets
    Presets,
    /// Write a job config file
    InitConfig {
        /// Destination (.yaml, .yml or .json)
        file: PathBuf,

        /// Preset to start from
        #[arg(short, long)]
        preset: Option<String>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

/// Command-line overrides applied on top of the loaded config.
struct Overrides {
    dpi: Option<f64>,
    lpi: Option<f64>,
    method: Option<Method>,
    kernel: Option<DiffusionKernel>,
    dot_shape: Option<DotShape>,
    white: Option<WhiteMode>,
    source_dpi: Option<f64>,
    backdrop: Option<Srgb>,
    noise: Option<f32>,
    seed: u64,
}

impl Overrides {
    fn apply(self, config: &mut JobConfig) {
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(lpi) = self.lpi {
            config.lpi = lpi;
        }
        if let Some(method) = self.method {
            config.method = method.into();
        }
        if let Some(kernel) = self.kernel {
            config.kernel = kernel;
        }
        if let Some(shape) = self.dot_shape {
            config.dot_shape = shape;
        }
        if let Some(white) = self.white {
            config.white = white.into();
        }
        if let Some(dpi) = self.source_dpi {
            config.source_dpi = Some(dpi);
        }
        if let Some(color) = self.backdrop {
            config.backdrop = color;
        }
        if let Some(amplitude) = self.noise {
            config.noise = Some(Noise {
                amplitude,
                seed: self.seed,
            });
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Process {
            input,
            output,
            name,
            preset,
            config,
            dpi,
            lpi,
            method,
            kernel,
            dot_shape,
            white,
            source_dpi,
            backdrop,
            noise,
            seed,
        }) => {
            let overrides = Overrides {
                dpi,
                lpi,
                method,
                kernel,
                dot_shape,
                white,
                source_dpi,
                backdrop,
                noise,
                seed,
            };
            run_process_command(
                &input,
                &output,
                name.as_deref(),
                preset.as_deref(),
                config.as_deref(),
                overrides,
            )
        }
        Some(Commands::Presets) => {
            run_presets_command();
            Ok(())
        }
        Some(Commands::InitConfig {
            file,
            preset,
            force,
        }) => run_init_config_command(&file, preset.as_deref(), force),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Separate, screen and export one image
fn run_process_command(
    input: &Path,
    output: &Path,
    name: Option<&str>,
    preset: Option<&str>,
    config_file: Option<&Path>,
    overrides: Overrides,
) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dtf_separator=info,halftone_engine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let mut config = match (preset, config_file) {
        (Some(preset), _) => JobConfig::preset(preset)?,
        (None, Some(path)) => JobConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        (None, None) => JobConfig::default(),
    };
    overrides.apply(&mut config);

    let runner = JobRunner::new(config)?;
    let report = runner
        .run(input, output, name)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    println!(
        "Processed {} ({}x{} at {} DPI)",
        input.display(),
        report.width,
        report.height,
        runner.config().dpi
    );
    println!("  {}", format_coverage(&report.coverage));
    for file in &report.files {
        println!("  + {}", file.display());
    }
    Ok(())
}

fn run_presets_command() {
    println!("Built-in presets:\n");
    for name in PRESETS {
        if let Ok(preset) = JobConfig::preset(name) {
            println!(
                "  {name:<16} {} DPI / {} LPI, white {}, dot gain {:.0}%",
                preset.dpi,
                preset.lpi,
                white_label(preset.white),
                preset.dot_gain * 100.0
            );
        }
    }
}

/// Write a job config file
fn run_init_config_command(file: &Path, preset: Option<&str>, force: bool) -> anyhow::Result<()> {
    if file.exists() && !force {
        eprintln!("{} already exists (use --force to overwrite)", file.display());
        std::process::exit(1);
    }
    let config = match preset {
        Some(name) => JobConfig::preset(name)?,
        None => JobConfig::default(),
    };
    config
        .save(file)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    println!("Wrote {}", file.display());
    Ok(())
}

fn white_label(policy: WhitePolicy) -> &'static str {
    match policy {
        WhitePolicy::Full => "full",
        WhitePolicy::Knockout => "knockout",
        WhitePolicy::None => "none",
        WhitePolicy::Underbase { .. } => "underbase",
        WhitePolicy::Density => "density",
        WhitePolicy::EdgeEnhanced { .. } => "edge-enhanced",
    }
}

/// Display version and default job settings
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config = JobConfig::default();

    println!("DTF Separator v{VERSION}");
    println!("CMYK+White separation and halftone screening for DTF printing\n");

    println!("Default job settings:");
    println!("  Resolution:  {} DPI / {} LPI", config.dpi, config.lpi);
    println!("  Method:      {}", config.screen_method());
    println!("  Dot shape:   {:?}", config.dot_shape);
    println!("  White:       {}", white_label(config.white));
    println!("  Ink limit:   {}%", config.total_ink_limit);
    println!("  Dot gain:    {:.0}%", config.dot_gain * 100.0);
    print!("  Angles:     ");
    for channel in Channel::ALL {
        print!(" {channel} {}°", config.angles[channel]);
    }
    println!();

    println!("\nCommands:");
    println!("  dtf-separator process       Separate and screen an image");
    println!("  dtf-separator presets       List built-in presets");
    println!("  dtf-separator init-config   Write a job config file");
    println!("\nRun 'dtf-separator --help' for more details.");
}
