//! DTF Separator
//!
//! Command-line shell around `halftone-engine`: job configuration, image
//! decoding and film export.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod services;
