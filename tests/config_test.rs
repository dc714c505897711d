//! Job config files: presets, YAML and JSON round trips.

mod common;

use dtf_separator::error::JobError;
use dtf_separator::models::{BlackGeneration, JobConfig, MethodKind, TiffCompression, PRESETS};
use halftone_engine::{Channel, DiffusionKernel, DotShape, Noise, Srgb, WhitePolicy};
use pretty_assertions::assert_eq;

fn customised() -> JobConfig {
    let mut config = JobConfig::preset("high-detail").unwrap();
    config.method = MethodKind::Hybrid;
    config.kernel = DiffusionKernel::Stucki;
    config.dot_shape = DotShape::Diamond;
    config.levels = 4;
    config.angles[Channel::White] = 60.0;
    config.white = WhitePolicy::EdgeEnhanced {
        threshold: 0.8,
        edge_threshold: 0.3,
    };
    config.black_generation = BlackGeneration::Gcr { strength: 0.5 };
    config.noise = Some(Noise {
        amplitude: 0.1,
        seed: 99,
    });
    config.source_dpi = Some(300.0);
    config.backdrop = Srgb::from_u8(0x1a, 0x1a, 0x1a);
    config.compression = TiffCompression::None;
    config
}

#[test]
fn test_yaml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.yaml");
    let config = customised();

    config.save(&path).unwrap();
    let loaded = JobConfig::load(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.json");
    let config = customised();

    config.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.trim_start().starts_with('{'), "JSON chosen by extension");

    assert_eq!(JobConfig::load(&path).unwrap(), config);
}

#[test]
fn test_colours_saved_as_hex() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.yml");
    customised().save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("#1A1A1A"), "{text}");
}

#[test]
fn test_partial_json_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.json");
    std::fs::write(&path, r#"{ "dpi": 300, "lpi": 45, "white": { "mode": "density" } }"#).unwrap();

    let config = JobConfig::load(&path).unwrap();
    assert_eq!(config.dpi, 300.0);
    assert_eq!(config.lpi, 45.0);
    assert_eq!(config.white, WhitePolicy::Density);
    assert_eq!(config.total_ink_limit, JobConfig::default().total_ink_limit);
    assert_eq!(config.angles, JobConfig::default().angles);
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.yaml");
    std::fs::write(&path, "dpi: [not, a, number]\n").unwrap();

    assert!(matches!(JobConfig::load(&path), Err(JobError::Config(_))));
}

#[test]
fn test_presets_match_original_values() {
    let expected = [
        ("epson-standard", 600.0, 55.0, 0.15, WhitePolicy::edge_enhanced()),
        ("high-detail", 600.0, 65.0, 0.10, WhitePolicy::underbase()),
        ("fast-production", 300.0, 45.0, 0.20, WhitePolicy::Density),
    ];
    assert_eq!(PRESETS.len(), expected.len());
    for (name, dpi, lpi, gain, white) in expected {
        let preset = JobConfig::preset(name).unwrap();
        assert_eq!(
            (preset.dpi, preset.lpi, preset.dot_gain, preset.white),
            (dpi, lpi, gain, white),
            "{name}"
        );
    }
}
