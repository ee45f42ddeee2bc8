//! # Pathwise
//!
//! Library half of the Pathwise binary: the clap command tree and the
//! course manifest format. `main.rs` only installs logging and dispatches.

pub mod cli;
pub mod manifest;
