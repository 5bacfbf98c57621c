//! CLI module containing argument parsing and related functionality

pub mod args;
pub mod enhanced_parser;

pub use args::{Action, Args};
