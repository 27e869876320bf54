//! Support library for the percolate CLI binary.
//!
//! Exposes the command pipeline, the Markdown report writer and the SVG
//! renderers so tests can drive them without spawning a subprocess.

pub mod cli;
pub mod logging;
pub mod markdown;
pub mod plot;
