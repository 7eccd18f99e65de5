//! Clap-backed option sink
//!
//! Collects the handlers a command dispatches, turns them into clap
//! arguments, and after parsing fires the registered callbacks in
//! command-line order.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};
use std::collections::HashMap;

use crate::cli::helpers::{canonical_name, parse_option_name, OptionName};
use crate::core::options::{FlagCallback, KeyCallback, OptionSink, Options};

/// Names clap claims for its own help flag
const HELP_NAMES: [&str; 2] = ["-h", "--help"];

/// Value clap records for every occurrence of a flag
const FLAG_OCCURRENCE: &str = "true";

enum OptionKind {
    Flag(Vec<FlagCallback>),
    Key {
        value_signature: String,
        callbacks: Vec<KeyCallback>,
    },
}

impl OptionKind {
    fn same_kind(&self, other: &OptionKind) -> bool {
        matches!(
            (self, other),
            (OptionKind::Flag(_), OptionKind::Flag(_)) | (OptionKind::Key { .. }, OptionKind::Key { .. })
        )
    }
}

/// One clap argument assembled from one or more registrations
struct RegisteredOption {
    id: String,
    names: Vec<OptionName>,
    usage: String,
    kind: OptionKind,
}

impl RegisteredOption {
    fn primary_name(&self) -> String {
        self.names.first().map(canonical_name).unwrap_or_default()
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id.clone());

        let mut has_short = false;
        let mut has_long = false;
        for name in &self.names {
            arg = match name {
                OptionName::Short(c) if !has_short => {
                    has_short = true;
                    arg.short(*c)
                }
                OptionName::Short(c) => arg.visible_short_alias(*c),
                OptionName::Long(s) if !has_long => {
                    has_long = true;
                    arg.long(s.clone())
                }
                OptionName::Long(s) => arg.visible_alias(s.clone()),
            };
        }

        if !self.usage.is_empty() {
            arg = arg.help(self.usage.clone());
        }

        match &self.kind {
            // Appending a marker per occurrence keeps every index and has no
            // upper bound, unlike ArgAction::Count
            OptionKind::Flag(_) => arg
                .action(ArgAction::Append)
                .num_args(0)
                .default_missing_value(FLAG_OCCURRENCE),
            OptionKind::Key {
                value_signature, ..
            } => arg
                .action(ArgAction::Append)
                .num_args(1)
                .value_name(value_signature.clone())
                .allow_negative_numbers(true),
        }
    }
}

/// Option registry for one command, backed by clap arguments
///
/// Registrations sharing a name with an earlier option of the same kind are
/// merged into it: the new names become aliases and every callback fires.
/// Anything clap could not represent is recorded in [`conflicts`](Self::conflicts).
#[derive(Default)]
pub struct ClapOptionSink {
    options: Vec<RegisteredOption>,
    by_name: HashMap<String, usize>,
    reserved: Vec<String>,
    conflicts: Vec<String>,
}

impl ClapOptionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that keeps `-h`/`--help` free for clap when help is enabled
    pub fn with_help_flag(help: bool) -> Self {
        let mut sink = Self::new();
        if help {
            sink.reserved = HELP_NAMES.iter().map(|n| n.to_string()).collect();
        }
        sink
    }

    /// Registrations that could not be turned into clap arguments
    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    /// Number of distinct options
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Whether clap will accept `name` for this command (help flags included)
    pub fn is_registered(&self, name: &str) -> bool {
        parse_option_name(name)
            .map(|parsed| {
                let canonical = canonical_name(&parsed);
                self.by_name.contains_key(&canonical) || self.reserved.contains(&canonical)
            })
            .unwrap_or(false)
    }

    /// Whether `name` is a key option expecting a value
    pub fn takes_value(&self, name: &str) -> bool {
        parse_option_name(name)
            .and_then(|parsed| self.by_name.get(&canonical_name(&parsed)))
            .map(|&idx| matches!(self.options[idx].kind, OptionKind::Key { .. }))
            .unwrap_or(false)
    }

    /// clap arguments for every registered option
    pub fn args(&self) -> Vec<Arg> {
        self.options.iter().map(RegisteredOption::to_arg).collect()
    }

    /// Record parsed options and fire callbacks in command-line order
    pub fn apply(&self, matches: &ArgMatches, options: &mut Options) {
        let mut events: Vec<(usize, &RegisteredOption, Option<&str>)> = Vec::new();

        for option in &self.options {
            if matches.value_source(&option.id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let indices: Vec<usize> = matches
                .indices_of(&option.id)
                .map(|indices| indices.collect())
                .unwrap_or_default();

            match &option.kind {
                OptionKind::Flag(_) => {
                    events.extend(indices.iter().map(|&index| (index, option, None)));
                }
                OptionKind::Key { .. } => {
                    let values = matches.get_many::<String>(&option.id).into_iter().flatten();
                    for (n, value) in values.enumerate() {
                        events.push((
                            indices.get(n).copied().unwrap_or(0),
                            option,
                            Some(value.as_str()),
                        ));
                    }
                }
            }
        }

        events.sort_by_key(|(index, _, _)| *index);

        for (_, option, value) in events {
            let primary = option.primary_name();
            match (&option.kind, value) {
                (OptionKind::Flag(callbacks), _) => {
                    for name in &option.names {
                        options.set_flag(&canonical_name(name));
                    }
                    for callback in callbacks {
                        callback(&primary);
                    }
                }
                (OptionKind::Key { callbacks, .. }, Some(value)) => {
                    for name in &option.names {
                        options.set_key(&canonical_name(name), value);
                    }
                    for callback in callbacks {
                        callback(&primary, value);
                    }
                }
                (OptionKind::Key { .. }, None) => {}
            }
        }
    }

    fn register(&mut self, names: &[String], usage: &str, kind: OptionKind) {
        if names.is_empty() {
            tracing::debug!("ignoring option handler with no names");
            return;
        }

        let mut parsed = Vec::with_capacity(names.len());
        for name in names {
            match parse_option_name(name) {
                Some(name) => parsed.push(name),
                None => {
                    self.conflicts.push(format!("invalid option name '{}'", name));
                    return;
                }
            }
        }

        if let Some(name) = parsed
            .iter()
            .map(canonical_name)
            .find(|name| self.reserved.contains(name))
        {
            self.conflicts
                .push(format!("{} is reserved for help while help is enabled", name));
            return;
        }

        let claimed: Vec<usize> = parsed
            .iter()
            .filter_map(|name| self.by_name.get(&canonical_name(name)).copied())
            .collect();

        let Some(&idx) = claimed.first() else {
            let idx = self.options.len();
            for name in &parsed {
                self.by_name.insert(canonical_name(name), idx);
            }
            self.options.push(RegisteredOption {
                id: format!("option:{}", idx),
                names: parsed,
                usage: usage.to_string(),
                kind,
            });
            return;
        };

        if claimed.iter().any(|&other| other != idx) {
            self.conflicts.push(format!(
                "{} spans several existing options",
                names.join(", ")
            ));
            return;
        }
        if !self.options[idx].kind.same_kind(&kind) {
            self.conflicts.push(format!(
                "{} is registered as both a flag and a key",
                names.join(", ")
            ));
            return;
        }

        let option = &mut self.options[idx];
        match (&mut option.kind, kind) {
            (OptionKind::Flag(callbacks), OptionKind::Flag(new)) => callbacks.extend(new),
            (
                OptionKind::Key { callbacks, .. },
                OptionKind::Key {
                    callbacks: new, ..
                },
            ) => callbacks.extend(new),
            _ => {}
        }
        if option.usage.is_empty() {
            option.usage = usage.to_string();
        }
        for name in parsed {
            if !option.names.contains(&name) {
                self.by_name.insert(canonical_name(&name), idx);
                option.names.push(name);
            }
        }
    }
}

impl OptionSink for ClapOptionSink {
    fn register_flag(&mut self, names: &[String], callback: Option<FlagCallback>, usage: &str) {
        self.register(names, usage, OptionKind::Flag(callback.into_iter().collect()));
    }

    fn register_key(
        &mut self,
        names: &[String],
        callback: Option<KeyCallback>,
        usage: &str,
        value_signature: &str,
    ) {
        self.register(
            names,
            usage,
            OptionKind::Key {
                value_signature: value_signature.to_string(),
                callbacks: callback.into_iter().collect(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn parse(sink: &ClapOptionSink, argv: &[&str]) -> Options {
        let cmd = clap::Command::new("test").args(sink.args());
        let matches = cmd.try_get_matches_from(argv.iter().copied()).unwrap();
        let mut options = Options::new();
        sink.apply(&matches, &mut options);
        options
    }

    #[test]
    fn test_flags_and_keys_are_parsed() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&names(&["-v", "--verbose"]), None, "verbose output");
        sink.register_key(&names(&["-n", "--name"]), None, "", "name");

        let options = parse(&sink, &["test", "--verbose", "-n", "Ada"]);
        assert!(options.has_flag("-v"));
        assert!(options.has_flag("verbose"));
        assert_eq!(options.value("name"), Some("Ada"));
        assert_eq!(options.value("-n"), Some("Ada"));
    }

    #[test]
    fn test_absent_options_are_not_recorded() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&names(&["-v"]), None, "");
        sink.register_key(&names(&["--name"]), None, "", "name");

        let options = parse(&sink, &["test"]);
        assert!(!options.has_flag("v"));
        assert_eq!(options.value("name"), None);
    }

    #[test]
    fn test_callbacks_fire_in_command_line_order() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let (a, b) = (Arc::clone(&seen), Arc::clone(&seen));

        let mut sink = ClapOptionSink::new();
        sink.register_flag(
            &names(&["-v", "--verbose"]),
            Some(Arc::new(move |flag: &str| a.lock().unwrap().push(flag.to_string()))),
            "",
        );
        sink.register_key(
            &names(&["--name"]),
            Some(Arc::new(move |key: &str, value: &str| {
                b.lock().unwrap().push(format!("{}={}", key, value))
            })),
            "",
            "name",
        );

        parse(&sink, &["test", "--name", "Ada", "--verbose", "--name=Grace"]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["--name=Ada", "-v", "--name=Grace"]
        );
    }

    #[test]
    fn test_overlapping_flag_registrations_merge() {
        let count = Arc::new(Mutex::new(0));
        let (a, b) = (Arc::clone(&count), Arc::clone(&count));

        let mut sink = ClapOptionSink::new();
        sink.register_flag(
            &names(&["-v"]),
            Some(Arc::new(move |_: &str| *a.lock().unwrap() += 1)),
            "",
        );
        sink.register_flag(
            &names(&["-v", "--verbose"]),
            Some(Arc::new(move |_: &str| *b.lock().unwrap() += 10)),
            "be loud",
        );

        assert_eq!(sink.len(), 1);
        assert!(sink.conflicts().is_empty());
        assert!(sink.is_registered("--verbose"));

        parse(&sink, &["test", "--verbose"]);
        assert_eq!(*count.lock().unwrap(), 11);
    }

    #[test]
    fn test_repeated_flag_fires_per_occurrence() {
        let count = Arc::new(Mutex::new(0));
        let a = Arc::clone(&count);

        let mut sink = ClapOptionSink::new();
        sink.register_flag(
            &names(&["-v"]),
            Some(Arc::new(move |_: &str| *a.lock().unwrap() += 1)),
            "",
        );

        let options = parse(&sink, &["test", "-v", "-v", "-vv"]);
        assert!(options.has_flag("v"));
        assert_eq!(*count.lock().unwrap(), 4);
    }

    #[test]
    fn test_flag_occurrences_are_not_capped() {
        let count = Arc::new(Mutex::new(0usize));
        let a = Arc::clone(&count);

        let mut sink = ClapOptionSink::new();
        sink.register_flag(
            &names(&["-v"]),
            Some(Arc::new(move |_: &str| *a.lock().unwrap() += 1)),
            "",
        );

        let mut argv = vec!["test"];
        argv.extend(std::iter::repeat("-v").take(300));
        parse(&sink, &argv);
        assert_eq!(*count.lock().unwrap(), 300);
    }

    #[test]
    fn test_repeated_flags_fire_at_their_own_positions() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let (a, b) = (Arc::clone(&seen), Arc::clone(&seen));

        let mut sink = ClapOptionSink::new();
        sink.register_flag(
            &names(&["-v"]),
            Some(Arc::new(move |flag: &str| a.lock().unwrap().push(flag.to_string()))),
            "",
        );
        sink.register_key(
            &names(&["-n"]),
            Some(Arc::new(move |_: &str, value: &str| {
                b.lock().unwrap().push(value.to_string())
            })),
            "",
            "name",
        );

        parse(&sink, &["test", "-v", "-n", "Ada", "-v"]);
        assert_eq!(*seen.lock().unwrap(), vec!["-v", "Ada", "-v"]);
    }

    #[test]
    fn test_key_accepts_negative_numbers() {
        let mut sink = ClapOptionSink::new();
        sink.register_key(&names(&["-r", "--repeat"]), None, "", "count");

        let options = parse(&sink, &["test", "--repeat", "-1"]);
        assert_eq!(options.value("repeat"), Some("-1"));

        let options = parse(&sink, &["test", "-r", "-2.5"]);
        assert_eq!(options.value("r"), Some("-2.5"));
    }

    #[test]
    fn test_flag_help_shows_no_value() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&names(&["-v", "--verbose"]), None, "verbose output");

        let args = sink.args();
        assert!(args[0].get_value_names().is_none());
        assert_eq!(args[0].get_num_args(), Some(0.into()));
    }

    #[test]
    fn test_flag_key_overlap_is_a_conflict() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&names(&["-n"]), None, "");
        sink.register_key(&names(&["-n", "--name"]), None, "", "name");

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.conflicts().len(), 1);
        assert!(sink.conflicts()[0].contains("both a flag and a key"));
        assert!(!sink.is_registered("--name"));
    }

    #[test]
    fn test_spanning_several_options_is_a_conflict() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&names(&["-a"]), None, "");
        sink.register_flag(&names(&["-b"]), None, "");
        sink.register_flag(&names(&["-a", "-b"]), None, "");

        assert_eq!(sink.len(), 2);
        assert!(sink.conflicts()[0].contains("spans several"));
    }

    #[test]
    fn test_empty_names_are_inert() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&[], None, "nothing");
        sink.register_key(&[], None, "", "value");

        assert!(sink.is_empty());
        assert!(sink.conflicts().is_empty());
    }

    #[test]
    fn test_invalid_names_are_conflicts() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&names(&["--"]), None, "");
        assert!(sink.is_empty());
        assert_eq!(sink.conflicts(), ["invalid option name '--'"]);
    }

    #[test]
    fn test_help_names_reserved_only_when_help_enabled() {
        let mut with_help = ClapOptionSink::with_help_flag(true);
        with_help.register_flag(&names(&["-h", "--host"]), None, "");
        assert!(with_help.is_empty());
        assert!(with_help.conflicts()[0].contains("reserved for help"));
        assert!(with_help.is_registered("--help"));

        let mut without_help = ClapOptionSink::with_help_flag(false);
        without_help.register_key(&names(&["-h", "--host"]), None, "", "host");
        assert!(without_help.conflicts().is_empty());
        assert!(without_help.takes_value("-h"));
        assert!(!without_help.is_registered("--help"));
    }

    #[test]
    fn test_takes_value() {
        let mut sink = ClapOptionSink::new();
        sink.register_flag(&names(&["-v"]), None, "");
        sink.register_key(&names(&["--name"]), None, "", "name");

        assert!(sink.takes_value("--name"));
        assert!(!sink.takes_value("-v"));
        assert!(!sink.takes_value("--missing"));
    }

    #[test]
    fn test_key_value_signature_is_the_value_name() {
        let mut sink = ClapOptionSink::new();
        sink.register_key(&names(&["--target"]), None, "target triple", "triple");

        let args = sink.args();
        assert_eq!(args.len(), 1);
        let value_names: Vec<String> = args[0]
            .get_value_names()
            .unwrap_or_default()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(value_names, ["triple"]);
        assert_eq!(args[0].get_long(), Some("target"));
    }
}
