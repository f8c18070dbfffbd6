// mdi-check: Microsoft 365 tenant discovery and Defender for Identity (MDI) check
// Exposes the pipeline stages as a library; the binary only wires them to the CLI

pub mod cli;
pub mod core;
pub mod dns;
pub mod error;
pub mod http;
pub mod output;
pub mod sanitize;
pub mod xml;
