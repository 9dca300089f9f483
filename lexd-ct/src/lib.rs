//! lexd-ct library - Curation Tools module
//!
//! Batch stages of the dictionary curation pipeline, one subcommand per
//! stage. The stages share the lexd stores but run as separate processes,
//! usually from cron or by hand, so each one opens exactly the stores it
//! needs and exits.

pub mod commands;
