//! HTTP API handlers

pub mod changes;
pub mod entries;
pub mod health;
