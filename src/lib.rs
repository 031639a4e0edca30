//! `clidef` is a command line definition and parsing library.
//!
//! Declare the options and arguments a tool accepts, parse token streams
//! against that definition, query the typed result, and render a usage
//! message.
//! The parser understands Posix short option clusters (`-xvf`), Gnu long
//! options (`--name=value`), property pairs (`-Dkey=value`), attached short
//! values (`-O2`), and single-hyphen long options (`-name value`).
//!
//! ```
//! use clidef::{Arg, Cli, Opt};
//!
//! let cli = Cli::build("copy")
//!     .summary("Copy files.")
//!     .option(Opt::new().long("directory").short('R').flag())
//!     .argument(Arg::new().name("source"))
//!     .argument(Arg::new().name("target"))
//!     .build()
//!     .unwrap();
//!
//! let line = cli.parse(["-R", "a.txt", "b.txt"]).unwrap();
//!
//! assert!(line.is_valid());
//! assert!(line.is_flag_enabled("directory").unwrap());
//! assert_eq!(line.argument_value_by_name("source").unwrap(), Some("a.txt"));
//! ```
#![deny(missing_docs)]
mod cli;
mod json;
mod model;
mod result;
mod scanner;
mod usage;

pub use cli::{Cli, CliBuilder};
pub use model::{Arg, DefinitionError, Opt};
pub use result::{CommandLine, LookupError, ValidationError};
pub use scanner::ScanError;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
