//! Public API for the halftone-engine crate.
//!
//! This module provides the high-level API: the [`HalftoneEngine`] builder,
//! cooperative cancellation through [`CancelToken`], progress [`Stage`]s and
//! the unified [`EngineError`] type.

mod builder;
mod cancel;
mod error;

pub use builder::HalftoneEngine;
pub(crate) use cancel::ROW_BATCH;
pub use cancel::{CancelToken, Stage};
pub use error::EngineError;
