//! Positional argument signatures
//!
//! A signature is a whitespace-separated list of `<name>` (required) and
//! `[<name>]` (optional) tokens. A trailing `...` makes the last positional
//! collect every remaining value: `<source> [<files>] ...`.

use clap::{Arg, ArgAction, ArgMatches};
use thiserror::Error;

use crate::core::options::Arguments;

/// One positional argument of a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positional {
    pub name: String,
    pub required: bool,
    pub variadic: bool,
}

impl Positional {
    /// clap id, kept apart from the ids option arguments use
    fn id(&self) -> String {
        format!("positional:{}", self.name)
    }
}

/// A parsed signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    positionals: Vec<Positional>,
}

/// Errors that can occur while parsing a signature
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature token '{0}', expected <name> or [<name>]")]
    MalformedToken(String),

    #[error("required argument <{0}> cannot follow an optional argument")]
    RequiredAfterOptional(String),

    #[error("'...' must directly follow the last argument")]
    MisplacedVariadic,

    #[error("argument <{0}> appears more than once")]
    Duplicate(String),
}

impl Signature {
    pub fn parse(signature: &str) -> Result<Self, SignatureError> {
        let tokens: Vec<&str> = signature.split_whitespace().collect();
        let mut positionals: Vec<Positional> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if *token == "..." {
                let last = positionals
                    .last_mut()
                    .filter(|p| !p.variadic)
                    .ok_or(SignatureError::MisplacedVariadic)?;
                if i + 1 != tokens.len() {
                    return Err(SignatureError::MisplacedVariadic);
                }
                last.variadic = true;
                continue;
            }

            let (name, required) = if let Some(inner) = token
                .strip_prefix("[<")
                .and_then(|t| t.strip_suffix(">]"))
            {
                (inner, false)
            } else if let Some(inner) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                (inner, true)
            } else {
                return Err(SignatureError::MalformedToken(token.to_string()));
            };

            if name.is_empty() || name.contains(['<', '>', '[', ']']) {
                return Err(SignatureError::MalformedToken(token.to_string()));
            }
            if positionals.iter().any(|p| p.name == name) {
                return Err(SignatureError::Duplicate(name.to_string()));
            }
            if required && positionals.iter().any(|p| !p.required) {
                return Err(SignatureError::RequiredAfterOptional(name.to_string()));
            }

            positionals.push(Positional {
                name: name.to_string(),
                required,
                variadic: false,
            });
        }

        Ok(Self { positionals })
    }

    pub fn positionals(&self) -> &[Positional] {
        &self.positionals
    }

    /// clap arguments in signature order
    pub fn to_args(&self) -> Vec<Arg> {
        self.positionals
            .iter()
            .map(|p| {
                let arg = Arg::new(p.id())
                    .value_name(p.name.clone())
                    .required(p.required)
                    .allow_negative_numbers(true);
                if p.variadic {
                    arg.action(ArgAction::Append).num_args(1..)
                } else {
                    arg.action(ArgAction::Set)
                }
            })
            .collect()
    }

    /// Collect matched positionals; variadic values are joined with spaces
    pub fn arguments(&self, matches: &ArgMatches) -> Arguments {
        let mut arguments = Arguments::new();
        for p in &self.positionals {
            let values: Vec<&str> = matches
                .get_many::<String>(&p.id())
                .map(|values| values.map(String::as_str).collect())
                .unwrap_or_default();
            if !values.is_empty() {
                arguments.insert(p.name.clone(), values.join(" "));
            }
        }
        arguments
    }
}
