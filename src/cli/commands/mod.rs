//! Commands bundled with the `lightcmd` binary
//!
//! Each is a [`LightweightCommand`](crate::core::LightweightCommand) built
//! from configuration; none defines its own type.

pub mod echo;
pub mod greet;

use crate::cli::router::{CommandRouter, RouterError};
use crate::core::Config;

/// Build the router with every bundled command registered
pub fn router(config: &Config) -> Result<CommandRouter, RouterError> {
    let mut router = CommandRouter::new(
        "lightcmd",
        env!("CARGO_PKG_VERSION"),
        "Subcommands assembled from configuration and callbacks",
    );
    router.register(greet::command(config))?;
    router.register(echo::command(config))?;
    Ok(router)
}
