//! Option registration contract and the values handed to a command at execution

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Called once per occurrence of a flag, with the flag's primary name
pub type FlagCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Called once per occurrence of a key option, with the key's primary name and value
pub type KeyCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// The runtime's option-registration subsystem
///
/// Commands replay their handlers into a sink; the sink decides how names are
/// parsed and how conflicts between registrations are resolved.
pub trait OptionSink {
    /// Register a flag (an option without a value)
    fn register_flag(&mut self, names: &[String], callback: Option<FlagCallback>, usage: &str);

    /// Register a key option taking one value
    fn register_key(
        &mut self,
        names: &[String],
        callback: Option<KeyCallback>,
        usage: &str,
        value_signature: &str,
    );
}

/// Strip the leading dashes of an option name
///
/// `--name`, `-name` and `name` all map to `name`.
pub fn option_key(name: &str) -> &str {
    name.trim_start_matches('-')
}

/// Positional arguments by signature name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(BTreeMap<String, String>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Options parsed for one invocation
///
/// Lookups accept any spelling of an option (`-n`, `--name`, `name`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    flags: BTreeSet<String>,
    keys: BTreeMap<String, String>,
    unrecognized: Vec<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a flag as present
    pub fn set_flag(&mut self, name: &str) {
        self.flags.insert(option_key(name).to_string());
    }

    /// Record a key value; a later value replaces an earlier one
    pub fn set_key(&mut self, name: &str, value: impl Into<String>) {
        self.keys.insert(option_key(name).to_string(), value.into());
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(option_key(name))
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.keys.get(option_key(name)).map(String::as_str)
    }

    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Options the runtime did not recognize but was told to tolerate
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    pub fn add_unrecognized(&mut self, token: impl Into<String>) {
        self.unrecognized.push(token.into());
    }
}
