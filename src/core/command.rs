//! Command trait - the contract every command offers to the host runtime

use serde::{Deserialize, Serialize};

use crate::core::options::{Arguments, OptionSink, Options};

/// Common interface for all commands a runtime can route to
///
/// [`LightweightCommand`](crate::core::LightweightCommand) implements this
/// from configuration; hand-written types may implement it directly and rely
/// on the default policy methods.
pub trait Command {
    /// Name used to route an invocation to this command
    fn name(&self) -> &str;

    /// Positional argument signature, e.g. `<person> [<greeting>]`
    fn signature(&self) -> &str;

    /// One-line description shown in the command listing
    fn short_description(&self) -> &str;

    /// Optional alias such as `-g`
    fn shortcut(&self) -> Option<&str> {
        None
    }

    /// Whether `-h`/`--help` prints help for this command
    fn show_help_on_help_flag(&self) -> bool {
        true
    }

    /// What to print when unrecognized options are encountered
    fn unrecognized_options_printing(&self) -> UnrecognizedOptionsPrinting {
        UnrecognizedOptionsPrinting::PrintAll
    }

    /// Whether unrecognized options abort the invocation
    fn fail_on_unrecognized_options(&self) -> bool {
        true
    }

    /// Register every option handler with the runtime's option subsystem
    fn dispatch_option_handlers(&self, _sink: &mut dyn OptionSink) {}

    /// Run the command against parsed arguments and options
    fn execute(&self, arguments: &Arguments, options: &Options) -> CommandResult;
}

/// Printing behavior when a command receives unrecognized options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnrecognizedOptionsPrinting {
    /// Usage statement followed by the unrecognized options
    #[default]
    PrintAll,
    /// Only the unrecognized options
    PrintOnlyUnrecognizedOptions,
    /// Nothing
    PrintNone,
}

impl std::fmt::Display for UnrecognizedOptionsPrinting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnrecognizedOptionsPrinting::PrintAll => write!(f, "print_all"),
            UnrecognizedOptionsPrinting::PrintOnlyUnrecognizedOptions => {
                write!(f, "print_only_unrecognized_options")
            }
            UnrecognizedOptionsPrinting::PrintNone => write!(f, "print_none"),
        }
    }
}

impl std::str::FromStr for UnrecognizedOptionsPrinting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "print_all" | "all" => Ok(UnrecognizedOptionsPrinting::PrintAll),
            "print_only_unrecognized_options" | "unrecognized" => {
                Ok(UnrecognizedOptionsPrinting::PrintOnlyUnrecognizedOptions)
            }
            "print_none" | "none" => Ok(UnrecognizedOptionsPrinting::PrintNone),
            _ => Err(format!("Unknown printing behavior: {}", s)),
        }
    }
}

/// Outcome of a command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Completed, optionally with a message for stdout
    Success(Option<String>),
    /// Failed with a message for stderr
    Failure(String),
}

impl CommandResult {
    pub fn success() -> Self {
        CommandResult::Success(None)
    }

    pub fn success_with(message: impl Into<String>) -> Self {
        CommandResult::Success(Some(message.into()))
    }

    pub fn failure(message: impl Into<String>) -> Self {
        CommandResult::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success(_))
    }

    /// The attached message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandResult::Success(message) => message.as_deref(),
            CommandResult::Failure(message) => Some(message),
        }
    }

    /// Process exit code for this result
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
