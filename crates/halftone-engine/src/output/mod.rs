//! Result assembly: the channel compositor and the preview renderer.
//!
//! [`compose`] checks that the five screened planes agree in size and
//! renders an RGB proof from them. The preview is built from the *screened*
//! planes, so it shows the dot structure that will actually print.

mod compose;
mod inks;
mod result;

pub use compose::{compose, compose_with, PreviewOptions};
pub use inks::ideal_inks;
pub use result::ProcessingResult;
