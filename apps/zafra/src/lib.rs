//! # zafra
//!
//! The Zafra farm-logistics ledger application: HTTP API, command-line
//! interface, configuration loading and report rendering on top of
//! `zafra-core`.

pub mod api;
pub mod cli;
pub mod config;
pub mod report;
