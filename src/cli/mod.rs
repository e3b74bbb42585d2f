//! `criteriac` subcommands and their runner, kept in the library so they can
//! be driven from tests.

mod command;
mod runner;
mod util;

pub use command::Command;
pub use runner::run;
pub use util::{ConfigSources, load_config, read_arg};
