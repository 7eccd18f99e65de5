//! Command router - the host runtime that lightweight commands plug into
//!
//! Registration validates each command, parses its signature and dispatches
//! its option handlers exactly once. Running routes on the first argument,
//! applies the command's unrecognized-option policy, parses with clap and
//! executes the command.

use clap::error::ErrorKind;
use miette::Diagnostic;
use std::io::Write;
use thiserror::Error;

use crate::cli::helpers::{format_option_list, looks_like_option};
use crate::cli::signature::{Signature, SignatureError};
use crate::cli::sink::ClapOptionSink;
use crate::core::command::{Command, CommandResult, UnrecognizedOptionsPrinting};
use crate::core::options::Options;

/// Shortcuts clap reserves on the top-level command
const RESERVED_SHORTCUTS: [&str; 4] = ["-h", "--help", "-V", "--version"];

/// Errors raised while registering or running commands
#[derive(Debug, Error, Diagnostic)]
pub enum RouterError {
    #[error("command name cannot be empty")]
    #[diagnostic(code(lightcmd::router::empty_name))]
    EmptyName,

    #[error("command '{0}' is already registered")]
    #[diagnostic(code(lightcmd::router::duplicate_command))]
    DuplicateCommand(String),

    #[error("shortcut '{shortcut}' of command '{command}' is already in use")]
    #[diagnostic(code(lightcmd::router::duplicate_shortcut))]
    DuplicateShortcut { command: String, shortcut: String },

    #[error("shortcut '{shortcut}' of command '{command}' is not valid")]
    #[diagnostic(
        code(lightcmd::router::invalid_shortcut),
        help("Use a single dashed character (-g), a long flag (--greet) or a bare alias (hi)")
    )]
    InvalidShortcut { command: String, shortcut: String },

    #[error("invalid signature for command '{command}': {source}")]
    #[diagnostic(code(lightcmd::router::signature))]
    InvalidSignature {
        command: String,
        #[source]
        source: SignatureError,
    },

    #[error("conflicting options in command '{command}': {details}")]
    #[diagnostic(code(lightcmd::router::option_conflict))]
    OptionConflict { command: String, details: String },

    #[error("unrecognized options for command '{command}': {options}")]
    #[diagnostic(
        code(lightcmd::router::unrecognized_options),
        help("Pass --help to the command to list the options it accepts")
    )]
    UnrecognizedOptions { command: String, options: String },

    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a shortcut is wired into clap
enum Shortcut<'a> {
    ShortFlag(char),
    LongFlag(&'a str),
    Alias(&'a str),
}

impl<'a> Shortcut<'a> {
    fn parse(shortcut: &'a str) -> Option<Self> {
        if let Some(long) = shortcut.strip_prefix("--") {
            return (!long.is_empty() && !long.starts_with('-')).then_some(Shortcut::LongFlag(long));
        }
        if let Some(short) = shortcut.strip_prefix('-') {
            let mut chars = short.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Shortcut::ShortFlag(c)),
                _ => None,
            };
        }
        (!shortcut.is_empty() && !shortcut.contains(char::is_whitespace))
            .then_some(Shortcut::Alias(shortcut))
    }
}

/// A registered command with everything dispatch produced for it
struct Entry {
    command: Box<dyn Command>,
    signature: Signature,
    sink: ClapOptionSink,
}

impl Entry {
    fn to_clap(&self) -> clap::Command {
        let cmd = &self.command;
        let mut sub = clap::Command::new(cmd.name().to_string())
            .args(self.signature.to_args())
            .args(self.sink.args());

        if !cmd.short_description().is_empty() {
            sub = sub.about(cmd.short_description().to_string());
        }
        if !cmd.show_help_on_help_flag() {
            sub = sub.disable_help_flag(true);
        }
        match cmd.shortcut().and_then(Shortcut::parse) {
            Some(Shortcut::ShortFlag(c)) => sub = sub.short_flag(c),
            Some(Shortcut::LongFlag(long)) => sub = sub.long_flag(long.to_string()),
            Some(Shortcut::Alias(alias)) => sub = sub.visible_alias(alias.to_string()),
            None => {}
        }
        sub
    }

    /// Split tokens into those clap will accept and unrecognized options
    ///
    /// A key option only takes the next token as its value when that token
    /// is not itself an option; negative numbers count as values.
    fn partition(&self, tokens: &[String]) -> (Vec<String>, Vec<String>) {
        let mut kept = Vec::new();
        let mut unrecognized = Vec::new();
        let mut iter = tokens.iter().peekable();

        while let Some(token) = iter.next() {
            if token == "--" {
                kept.push(token.clone());
                kept.extend(iter.by_ref().cloned());
                break;
            }
            if !looks_like_option(token) {
                kept.push(token.clone());
                continue;
            }

            if let Some(rest) = token.strip_prefix("--") {
                let (name, inline_value) = match rest.split_once('=') {
                    Some((name, _)) => (name, true),
                    None => (rest, false),
                };
                let name = format!("--{}", name);
                if self.sink.is_registered(&name) {
                    kept.push(token.clone());
                    if self.sink.takes_value(&name) && !inline_value {
                        kept.extend(iter.next_if(|next| !looks_like_option(next)).cloned());
                    }
                } else {
                    unrecognized.push(token.clone());
                }
                continue;
            }

            // Short options, possibly clustered (-vl) or with an attached value (-nAda)
            let cluster = &token[1..];
            let mut recognized = true;
            let mut consumes_next = false;
            for (i, c) in cluster.char_indices() {
                let name = format!("-{}", c);
                if !self.sink.is_registered(&name) {
                    recognized = false;
                    break;
                }
                if self.sink.takes_value(&name) {
                    consumes_next = i + c.len_utf8() == cluster.len();
                    break;
                }
            }

            if recognized {
                kept.push(token.clone());
                if consumes_next {
                    kept.extend(iter.next_if(|next| !looks_like_option(next)).cloned());
                }
            } else {
                unrecognized.push(token.clone());
            }
        }

        (kept, unrecognized)
    }
}

/// Top-level router aggregating commands into one clap application
pub struct CommandRouter {
    name: String,
    version: String,
    about: String,
    entries: Vec<Entry>,
}

impl CommandRouter {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        about: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            about: about.into(),
            entries: Vec::new(),
        }
    }

    /// Register a command and dispatch its option handlers
    pub fn register<C: Command + 'static>(&mut self, command: C) -> Result<(), RouterError> {
        self.register_boxed(Box::new(command))
    }

    pub fn register_boxed(&mut self, command: Box<dyn Command>) -> Result<(), RouterError> {
        let name = command.name().to_string();
        if name.trim().is_empty() {
            return Err(RouterError::EmptyName);
        }
        if self.find(&name).is_some() {
            return Err(RouterError::DuplicateCommand(name));
        }

        if let Some(shortcut) = command.shortcut() {
            if Shortcut::parse(shortcut).is_none() {
                return Err(RouterError::InvalidShortcut {
                    command: name,
                    shortcut: shortcut.to_string(),
                });
            }
            if shortcut == name
                || RESERVED_SHORTCUTS.contains(&shortcut)
                || self.find(shortcut).is_some()
            {
                return Err(RouterError::DuplicateShortcut {
                    command: name,
                    shortcut: shortcut.to_string(),
                });
            }
        }

        let signature =
            Signature::parse(command.signature()).map_err(|source| RouterError::InvalidSignature {
                command: name.clone(),
                source,
            })?;

        let mut sink = ClapOptionSink::with_help_flag(command.show_help_on_help_flag());
        command.dispatch_option_handlers(&mut sink);
        if !sink.conflicts().is_empty() {
            return Err(RouterError::OptionConflict {
                command: name,
                details: sink.conflicts().join("; "),
            });
        }

        tracing::debug!(command = %name, options = sink.len(), "command registered");
        self.entries.push(Entry {
            command,
            signature,
            sink,
        });
        Ok(())
    }

    /// Names of registered commands, in registration order
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.command.name())
    }

    /// The full clap command tree, e.g. for rendering help or completions
    pub fn clap_command(&self) -> clap::Command {
        let mut root = clap::Command::new(self.name.clone())
            .version(self.version.clone())
            .subcommand_required(true)
            .arg_required_else_help(true)
            .disable_help_subcommand(true);
        if !self.about.is_empty() {
            root = root.about(self.about.clone());
        }
        for entry in &self.entries {
            root = root.subcommand(entry.to_clap());
        }
        root
    }

    /// Run with the process arguments, writing runtime output to stdout
    pub fn run(&self) -> Result<CommandResult, RouterError> {
        self.run_from(std::env::args(), &mut std::io::stdout())
    }

    /// Route, parse and execute one invocation
    ///
    /// `args` includes the program name. Help, version and unrecognized
    /// option reports are written to `out`.
    pub fn run_from<I, T>(&self, args: I, out: &mut dyn Write) -> Result<CommandResult, RouterError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut argv: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut unrecognized = Vec::new();

        if let Some(entry) = argv.get(1).and_then(|token| self.find(token)) {
            let (kept, dropped) = entry.partition(&argv[2..]);
            if !dropped.is_empty() {
                self.report_unrecognized(entry, &dropped, out)?;
                if entry.command.fail_on_unrecognized_options() {
                    return Err(RouterError::UnrecognizedOptions {
                        command: entry.command.name().to_string(),
                        options: format_option_list(&dropped),
                    });
                }
                tracing::warn!(
                    command = entry.command.name(),
                    "ignoring unrecognized options: {}",
                    format_option_list(&dropped)
                );
                unrecognized = dropped;
            }
            argv.truncate(2);
            argv.extend(kept);
        }

        let matches = match self.clap_command().try_get_matches_from(argv.iter()) {
            Ok(matches) => matches,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                write!(out, "{}", e.render())?;
                return Ok(CommandResult::success());
            }
            Err(e) => return Err(e.into()),
        };

        // subcommand_required and a tree built from `entries` guarantee a match
        let Some((entry, sub_matches)) = matches.subcommand().and_then(|(name, sub_matches)| {
            self.entries
                .iter()
                .find(|e| e.command.name() == name)
                .map(|entry| (entry, sub_matches))
        }) else {
            let mut root = self.clap_command();
            return Err(root
                .error(ErrorKind::MissingSubcommand, "a command is required")
                .into());
        };

        let arguments = entry.signature.arguments(sub_matches);
        let mut options = Options::new();
        for token in unrecognized {
            options.add_unrecognized(token);
        }
        entry.sink.apply(sub_matches, &mut options);

        tracing::debug!(
            command = entry.command.name(),
            arguments = arguments.len(),
            "executing command"
        );
        Ok(entry.command.execute(&arguments, &options))
    }

    fn find(&self, token: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.command.name() == token || e.command.shortcut() == Some(token))
    }

    fn usage_for(&self, entry: &Entry) -> String {
        let mut root = self.clap_command();
        root.build();
        root.find_subcommand_mut(entry.command.name())
            .map(|sub| sub.render_usage().to_string())
            .unwrap_or_default()
    }

    fn report_unrecognized(
        &self,
        entry: &Entry,
        tokens: &[String],
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        match entry.command.unrecognized_options_printing() {
            UnrecognizedOptionsPrinting::PrintAll => {
                writeln!(out, "{}", self.usage_for(entry))?;
                writeln!(out)?;
                writeln!(out, "Unrecognized options: {}", format_option_list(tokens))
            }
            UnrecognizedOptionsPrinting::PrintOnlyUnrecognizedOptions => {
                writeln!(out, "Unrecognized options: {}", format_option_list(tokens))
            }
            UnrecognizedOptionsPrinting::PrintNone => Ok(()),
        }
    }
}
