use console::style;
use miette::Result;

use lightcmd::cli::commands;
use lightcmd::cli::logging::init_logging;
use lightcmd::cli::RouterError;
use lightcmd::{CommandResult, Config};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let config = Config::load();
    init_logging(config.log_filter());

    let router = commands::router(&config)?;
    let result = match router.run() {
        Ok(result) => result,
        // clap formats its own errors and picks the exit code
        Err(RouterError::Parse(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };

    match &result {
        CommandResult::Success(Some(message)) => println!("{}", message),
        CommandResult::Success(None) => {}
        CommandResult::Failure(message) => eprintln!("{} {}", style("✗").red(), message),
    }
    std::process::exit(result.exit_code())
}
