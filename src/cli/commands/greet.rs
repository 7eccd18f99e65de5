//! `lightcmd greet` command - greet someone by name

use std::sync::Arc;

use crate::core::{CommandResult, Config, LightweightCommand};

pub fn command(config: &Config) -> LightweightCommand {
    let mut greet = LightweightCommand::from_config("greet", config);
    greet.signature = "[<person>]".to_string();
    greet.short_description = "Greet someone by name".to_string();
    greet.shortcut = Some("-g".to_string());

    greet.handle_flags(
        ["-v", "--verbose"],
        Some(Arc::new(|flag: &str| tracing::info!(flag, "verbose output enabled"))),
        "verbose output",
    );
    greet.handle_flags(["-l", "--loud"], None, "shout the greeting");
    greet.handle_keys(
        ["-n", "--name"],
        None,
        "name to greet when no person is given",
        "name",
    );

    greet.on_execute(|args, options| {
        let who = args
            .get("person")
            .or_else(|| options.value("name"))
            .unwrap_or("world");

        let mut greeting = format!("Hello, {}!", who);
        if options.has_flag("loud") {
            greeting = greeting.to_uppercase();
        }
        if options.has_flag("verbose") {
            let source = if args.contains("person") {
                "argument"
            } else if options.value("name").is_some() {
                "--name"
            } else {
                "default"
            };
            greeting.push_str(&format!("\n(name taken from {})", source));
        }
        CommandResult::success_with(greeting)
    });

    greet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Arguments, Command, Options};

    #[test]
    fn test_greet_prefers_positional_over_key() {
        let greet = command(&Config::default());
        let args: Arguments = [("person", "Ada")].into_iter().collect();
        let mut options = Options::new();
        options.set_key("name", "Grace");

        let result = greet.execute(&args, &options);
        assert_eq!(result, CommandResult::success_with("Hello, Ada!"));
    }

    #[test]
    fn test_greet_loud_verbose() {
        let greet = command(&Config::default());
        let mut options = Options::new();
        options.set_key("--name", "Ada");
        options.set_flag("--loud");
        options.set_flag("--verbose");

        let result = greet.execute(&Arguments::new(), &options);
        assert_eq!(
            result.message(),
            Some("HELLO, ADA!\n(name taken from --name)")
        );
    }

    #[test]
    fn test_greet_handlers() {
        let greet = command(&Config::default());
        assert_eq!(greet.flag_handlers().len(), 2);
        assert_eq!(greet.key_handlers()[0].value_signature(), "name");
        assert_eq!(greet.shortcut(), Some("-g"));
    }
}
