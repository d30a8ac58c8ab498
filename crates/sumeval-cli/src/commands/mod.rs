//! CLI commands

pub mod eval;
