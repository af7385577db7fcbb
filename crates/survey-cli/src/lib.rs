//! Library side of the `survey-dash` binary: logging setup and rendering.

pub mod logging;
pub mod render;
