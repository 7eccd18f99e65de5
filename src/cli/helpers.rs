//! Shared helper functions for the clap runtime
//!
//! Option name classification and token inspection used by both the option
//! sink and the router.

/// A registered option name as clap understands it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionName {
    /// `-x`
    Short(char),
    /// `--name`, or any other spelling that is not a single dashed char
    Long(String),
}

/// Classify an option name
///
/// Returns `None` for names with nothing after the dashes (`-`, `--`).
pub fn parse_option_name(name: &str) -> Option<OptionName> {
    let mut chars = name.chars();
    if chars.next() == Some('-') {
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c != '-' {
                return Some(OptionName::Short(c));
            }
        }
    }

    let bare = name.trim_start_matches('-');
    if bare.is_empty() || bare.contains('=') || bare.contains(char::is_whitespace) {
        None
    } else {
        Some(OptionName::Long(bare.to_string()))
    }
}

/// Canonical spelling of a name: `-x` or `--name`
pub fn canonical_name(name: &OptionName) -> String {
    match name {
        OptionName::Short(c) => format!("-{}", c),
        OptionName::Long(s) => format!("--{}", s),
    }
}

/// Whether a command-line token should be treated as an option
///
/// Negative numbers and a lone `-` (stdin convention) are values.
pub fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}

/// Join option tokens for display
pub fn format_option_list(tokens: &[String]) -> String {
    tokens.join(", ")
}
