//! Receipt CLI - command-line front end for the receipt generator
//!
//! Subcommands:
//! - `manual`: fill a template with explicit identifiers
//! - `auto`: derive operation number, SBP id and document id from a timestamp
//! - `sbp` / `opn`: print a single identifier
//! - `extract`: print the text shown by a receipt

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::run;
