// NOTE: logweave CLI scope
//
// The binary is a thin shell over logweave-engine: one log path in, pretty
// JSON out. Session discovery, rendering and search live elsewhere.

mod args;
mod commands;
pub mod config;
pub mod logging;

pub use args::{Cli, Commands, ExtractArgs};
pub use commands::run;
