//! Command-line interface
//!
//! The built-in clap help and version flags are replaced so that `-h` and
//! `-v` behave like the rest of the single-letter switches.

use clap::{ArgAction, CommandFactory, Parser};
use sdk_client_core::ClientConfig;

/// List the Android SDK components published in the official repository
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(
    name = "android-sdk-client",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Display this help
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,

    /// Display extended list with download URLs
    #[arg(short = 'e', long = "extended", action = ArgAction::SetTrue)]
    pub extended: bool,

    /// Show obsolete items
    #[arg(short = 'o', long = "obsolete", action = ArgAction::SetTrue)]
    pub obsolete: bool,

    /// Save original XMLs locally to directory "export"
    #[arg(short = 's', long = "save", action = ArgAction::SetTrue)]
    pub save: bool,

    /// Display version
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,
}

impl Cli {
    /// Run configuration selected by the flags
    pub fn config(&self) -> ClientConfig {
        ClientConfig::from_flags(self.extended, self.obsolete, self.save)
    }

    /// Usage text
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}
