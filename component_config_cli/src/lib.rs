//! Library interface for the `compose` command.
//!
//! `compose` loads component class declarations, builds a registry, and
//! prints resolved class metadata, class chains, block nodes, or finalized
//! component instances as JSON.

pub mod cli;
pub mod commands;
pub mod error;
