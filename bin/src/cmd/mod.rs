//! CLI subcommand modules.
//!
//! This module contains the implementations for all ronda CLI subcommands.

pub(crate) mod levels;
pub(crate) mod summary;
pub(crate) mod weights;
