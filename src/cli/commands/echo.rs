//! `lightcmd echo` command - print words back
//!
//! Tolerates options it does not know: they are listed and skipped instead
//! of aborting the run.

use crate::core::{CommandResult, Config, LightweightCommand, UnrecognizedOptionsPrinting};

pub fn command(config: &Config) -> LightweightCommand {
    let mut echo = LightweightCommand::from_config("echo", config);
    echo.signature = "<words> ...".to_string();
    echo.short_description = "Print words back".to_string();
    echo.fail_on_unrecognized_options = false;
    echo.unrecognized_options_printing = UnrecognizedOptionsPrinting::PrintOnlyUnrecognizedOptions;

    echo.handle_flags(["-u", "--upper"], None, "uppercase the output");
    echo.handle_keys(["-r", "--repeat"], None, "print the words this many times", "count");

    echo.on_execute(|args, options| {
        let words = args.get("words").unwrap_or_default();
        let repeat = match options.value("repeat").map(str::parse::<usize>) {
            None => 1,
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                return CommandResult::failure(format!(
                    "invalid repeat count '{}'",
                    options.value("repeat").unwrap_or_default()
                ))
            }
        };

        let line = if options.has_flag("upper") {
            words.to_uppercase()
        } else {
            words.to_string()
        };
        CommandResult::success_with(vec![line; repeat].join("\n"))
    });

    echo
}
