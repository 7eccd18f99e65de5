//! CLI module - the clap host runtime and the bundled commands

pub mod commands;
pub mod helpers;
pub mod logging;
pub mod router;
pub mod signature;
pub mod sink;

pub use router::{CommandRouter, RouterError};
pub use signature::{Signature, SignatureError};
pub use sink::ClapOptionSink;
