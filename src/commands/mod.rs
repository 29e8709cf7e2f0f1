//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod analyze_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;

use clap::ArgMatches;
use crate::utils::logger::Logger;
use crate::tiff::errors::TiffResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct RasterkitCommandFactory;

impl RasterkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        RasterkitCommandFactory
    }
}

impl<'a> CommandFactory<'a> for RasterkitCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> TiffResult<Box<dyn Command + 'a>> {
        Ok(Box::new(AnalyzeCommand::new(args, logger)?))
    }
}