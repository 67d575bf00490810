//! Source a shell script in its native interpreter and capture the
//! variables it sets.
//!
//! A script may set variables via assignment, export, or side effects of
//! files it sources in turn; no portable API exposes those bindings to a
//! process that is not the shell that ran it. This crate generates a small
//! wrapper program, hands it to the target interpreter as a subprocess, and
//! parses the delimited variable dump the wrapper prints back into an
//! ordered name→value mapping.
//!
//! ```no_run
//! use shellvars::source;
//!
//! // env.sh:  export FOO=bar
//! //          BAZ=qux
//! let variables = source("./env.sh")?;
//! assert_eq!(variables["FOO"], "bar");
//! assert_eq!(variables["BAZ"], "qux");
//! # Ok::<(), shellvars::SourceError>(())
//! ```
//!
//! Shell dialects are pure data ([`dialect::ShellConfig`]): POSIX-family
//! shells share one builtin profile, csh/tcsh and fish have their own, and
//! anything else takes a caller-supplied profile (optionally loaded from
//! YAML). The fragile part — scraping delimited text out of a live shell —
//! is isolated in [`parser`] and testable on fixtures without spawning a
//! shell.

pub mod dialect;
pub mod error;
pub mod exec;
pub mod exit_codes;
pub mod parser;
pub mod resolver;
pub mod shebang;
pub mod source;
pub mod template;
pub mod wrapper;

pub use dialect::{QuoteStyle, ShellConfig};
pub use error::{Result, SourceError};
pub use source::{SourceOutcome, SourceRequest, source};

/// Ordered name→value mapping; insertion order is the order the shell
/// reported the variables in.
pub type VariableMap = indexmap::IndexMap<String, String>;
