//! Lightweight commands - a `Command` assembled from fields and callbacks
//!
//! Instead of declaring a type per subcommand, callers build one
//! [`LightweightCommand`], set its identity and parsing policy, register
//! option handlers and an execution callback, and hand it to the runtime:
//!
//! ```
//! use std::sync::Arc;
//! use lightcmd::{CommandResult, LightweightCommand};
//!
//! let mut greet = LightweightCommand::new("greet");
//! greet.signature = "[<person>]".to_string();
//! greet.short_description = "Say hello".to_string();
//! greet.handle_flags(["-l", "--loud"], None, "shout the greeting");
//! greet.handle_keys(
//!     ["-n", "--name"],
//!     Some(Arc::new(|key: &str, value: &str| println!("{key} = {value}"))),
//!     "who to greet",
//!     "name",
//! );
//! greet.on_execute(|args, options| {
//!     let who = args.get("person").or(options.value("name")).unwrap_or("world");
//!     CommandResult::success_with(format!("Hello, {who}!"))
//! });
//! ```

use std::fmt;

use crate::core::command::{Command, CommandResult, UnrecognizedOptionsPrinting};
use crate::core::config::Config;
use crate::core::options::{Arguments, FlagCallback, KeyCallback, OptionSink, Options};

/// Runs a lightweight command against parsed arguments and options
pub type ExecutionCallback = Box<dyn Fn(&Arguments, &Options) -> CommandResult + Send + Sync>;

/// A registered flag handler awaiting replay into the runtime
#[derive(Clone)]
pub struct FlagHandler {
    names: Vec<String>,
    callback: Option<FlagCallback>,
    usage: String,
}

impl FlagHandler {
    pub fn new(
        names: impl IntoIterator<Item = impl Into<String>>,
        callback: Option<FlagCallback>,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            names: collect_names(names),
            callback,
            usage: usage.into(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn callback(&self) -> Option<&FlagCallback> {
        self.callback.as_ref()
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }
}

impl fmt::Debug for FlagHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagHandler")
            .field("names", &self.names)
            .field("callback", &self.callback.is_some())
            .field("usage", &self.usage)
            .finish()
    }
}

/// A registered key handler awaiting replay into the runtime
#[derive(Clone)]
pub struct KeyHandler {
    names: Vec<String>,
    callback: Option<KeyCallback>,
    usage: String,
    value_signature: String,
}

impl KeyHandler {
    pub fn new(
        names: impl IntoIterator<Item = impl Into<String>>,
        callback: Option<KeyCallback>,
        usage: impl Into<String>,
        value_signature: impl Into<String>,
    ) -> Self {
        Self {
            names: collect_names(names),
            callback,
            usage: usage.into(),
            value_signature: value_signature.into(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn callback(&self) -> Option<&KeyCallback> {
        self.callback.as_ref()
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn value_signature(&self) -> &str {
        &self.value_signature
    }
}

impl fmt::Debug for KeyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandler")
            .field("names", &self.names)
            .field("callback", &self.callback.is_some())
            .field("usage", &self.usage)
            .field("value_signature", &self.value_signature)
            .finish()
    }
}

/// Names form a set: duplicates are dropped, first spelling order is kept
fn collect_names(names: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();
    for name in names {
        let name = name.into();
        if !collected.contains(&name) {
            collected.push(name);
        }
    }
    collected
}

/// Value signature used by [`LightweightCommand::handle_keys`] callers that have no better name
pub const DEFAULT_VALUE_SIGNATURE: &str = "value";

/// A command configured through fields and callbacks
pub struct LightweightCommand {
    pub name: String,
    pub signature: String,
    pub short_description: String,
    pub shortcut: Option<String>,

    pub fail_on_unrecognized_options: bool,
    pub show_help_on_help_flag: bool,
    pub unrecognized_options_printing: UnrecognizedOptionsPrinting,

    flag_handlers: Vec<FlagHandler>,
    key_handlers: Vec<KeyHandler>,
    execution: Option<ExecutionCallback>,
}

impl LightweightCommand {
    /// Create a command with default policies and no handlers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: String::new(),
            short_description: String::new(),
            shortcut: None,
            fail_on_unrecognized_options: true,
            show_help_on_help_flag: true,
            unrecognized_options_printing: UnrecognizedOptionsPrinting::PrintAll,
            flag_handlers: Vec::new(),
            key_handlers: Vec::new(),
            execution: None,
        }
    }

    /// Create a command whose policies come from user configuration
    pub fn from_config(name: impl Into<String>, config: &Config) -> Self {
        let mut cmd = Self::new(name);
        cmd.fail_on_unrecognized_options = config.fail_on_unrecognized_options();
        cmd.show_help_on_help_flag = config.show_help_on_help_flag();
        cmd.unrecognized_options_printing = config.unrecognized_options_printing();
        cmd
    }

    /// Append a flag handler; nothing reaches the runtime until dispatch
    ///
    /// An empty name set is accepted and matches nothing.
    pub fn handle_flags(
        &mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
        callback: Option<FlagCallback>,
        usage: impl Into<String>,
    ) {
        let handler = FlagHandler::new(names, callback, usage);
        tracing::debug!(command = %self.name, names = ?handler.names, "flag handler registered");
        self.flag_handlers.push(handler);
    }

    /// Append a key handler; nothing reaches the runtime until dispatch
    ///
    /// Pass [`DEFAULT_VALUE_SIGNATURE`] when the value needs no specific name.
    pub fn handle_keys(
        &mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
        callback: Option<KeyCallback>,
        usage: impl Into<String>,
        value_signature: impl Into<String>,
    ) {
        let handler = KeyHandler::new(names, callback, usage, value_signature);
        tracing::debug!(command = %self.name, names = ?handler.names, "key handler registered");
        self.key_handlers.push(handler);
    }

    /// Set the execution callback, replacing any previous one
    pub fn on_execute<F>(&mut self, callback: F)
    where
        F: Fn(&Arguments, &Options) -> CommandResult + Send + Sync + 'static,
    {
        if self.execution.is_some() {
            tracing::debug!(command = %self.name, "replacing execution callback");
        }
        self.execution = Some(Box::new(callback));
    }

    pub fn has_execution_callback(&self) -> bool {
        self.execution.is_some()
    }

    pub fn flag_handlers(&self) -> &[FlagHandler] {
        &self.flag_handlers
    }

    pub fn key_handlers(&self) -> &[KeyHandler] {
        &self.key_handlers
    }
}

impl fmt::Debug for LightweightCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightweightCommand")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("short_description", &self.short_description)
            .field("shortcut", &self.shortcut)
            .field("fail_on_unrecognized_options", &self.fail_on_unrecognized_options)
            .field("show_help_on_help_flag", &self.show_help_on_help_flag)
            .field("unrecognized_options_printing", &self.unrecognized_options_printing)
            .field("flag_handlers", &self.flag_handlers)
            .field("key_handlers", &self.key_handlers)
            .field("execution", &self.execution.is_some())
            .finish()
    }
}

impl Command for LightweightCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &str {
        &self.signature
    }

    fn short_description(&self) -> &str {
        &self.short_description
    }

    fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    fn show_help_on_help_flag(&self) -> bool {
        self.show_help_on_help_flag
    }

    fn unrecognized_options_printing(&self) -> UnrecognizedOptionsPrinting {
        self.unrecognized_options_printing
    }

    fn fail_on_unrecognized_options(&self) -> bool {
        self.fail_on_unrecognized_options
    }

    /// Replays all flag handlers, then all key handlers, each in registration order
    fn dispatch_option_handlers(&self, sink: &mut dyn OptionSink) {
        for handler in &self.flag_handlers {
            tracing::trace!(command = %self.name, names = ?handler.names, "dispatching flag handler");
            sink.register_flag(&handler.names, handler.callback.clone(), &handler.usage);
        }

        for handler in &self.key_handlers {
            tracing::trace!(command = %self.name, names = ?handler.names, "dispatching key handler");
            sink.register_key(
                &handler.names,
                handler.callback.clone(),
                &handler.usage,
                &handler.value_signature,
            );
        }
    }

    /// # Panics
    ///
    /// Panics if no execution callback was set; that is a configuration bug.
    fn execute(&self, arguments: &Arguments, options: &Options) -> CommandResult {
        match &self.execution {
            Some(callback) => callback(arguments, options),
            None => panic!(
                "lightweight command `{}` executed without an execution callback",
                self.name
            ),
        }
    }
}
