//! lightcmd: declarative CLI subcommands
//!
//! Commands are assembled from plain fields and callbacks on a single
//! [`LightweightCommand`] instead of a dedicated type per command, then
//! handed to a host runtime (the clap-backed [`cli::CommandRouter`]).

pub mod cli;
pub mod core;

pub use crate::core::{
    Arguments, Command, CommandResult, Config, LightweightCommand, OptionSink, Options,
    UnrecognizedOptionsPrinting,
};
