//! Lumen web UI application library.
//!
//! Wires settings, telemetry, the backend client, and the page registry into
//! a serving HTTP pipeline.

pub mod app;
pub mod modules;
pub mod utils;
