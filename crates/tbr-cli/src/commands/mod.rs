//! Command handlers for the one-shot CLI subcommands

pub mod book;
pub mod config;
pub mod import;
