//! Core module - the command contract and the configurable command

pub mod command;
pub mod config;
pub mod lightweight;
pub mod options;

pub use command::{Command, CommandResult, UnrecognizedOptionsPrinting};
pub use config::{Config, ConfigError};
pub use lightweight::{
    ExecutionCallback, FlagHandler, KeyHandler, LightweightCommand, DEFAULT_VALUE_SIGNATURE,
};
pub use options::{option_key, Arguments, FlagCallback, KeyCallback, OptionSink, Options};
