//! Wrapper program generation.
//!
//! The wrapper is the small program handed to the target interpreter: it
//! sources the caller's script inside the live shell session, then prints
//! three delimited sections to stdout (environment dump, all-variables dump,
//! exit status) for the output parser to scan.
//!
//! For dialects with an EXIT trap the dump commands are registered as a trap
//! before sourcing, so a script that calls `exit` still produces a complete
//! dump with its real exit status. Trap-less dialects (csh family) get a
//! linear layout instead.

#[cfg(test)]
mod tests;

use crate::dialect::ShellConfig;
use crate::error::Result;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::path::{Path, PathBuf};

/// Prefix shared by every variable the wrapper itself declares inside the
/// shell session. The resolver strips names carrying it from results.
pub(crate) const INTERNAL_PREFIX: &str = "__shellvars_";

/// Variable the wrapper stashes the sourced script's exit status in, before
/// any dump command can clobber `$?`.
const RC_VAR: &str = "__shellvars_rc";

const TOKEN_RANDOM_LEN: usize = 24;

/// Delimiter tokens marking the three output sections.
///
/// Each token is freshly generated per call from a high-entropy alphanumeric
/// suffix behind a static marker, so concurrent invocations cannot collide
/// and no realistic script output contains one verbatim. A variable value
/// that legitimately contains a generated token would corrupt the scan; this
/// is an accepted, astronomically unlikely limitation rather than something
/// the wrapper escapes against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    /// Marks the start of the environment dump.
    pub env: String,
    /// Marks the start of the all-variables dump; absent when locals are
    /// ignored and the wrapper skips that section entirely.
    pub locals: Option<String>,
    /// Marks the exit-status line.
    pub exit: String,
}

/// Options controlling wrapper generation.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Skip the all-variables section; only the environment is dumped.
    pub ignore_locals: bool,
    /// Redirect the sourced script's own stdout to this file so it cannot
    /// interleave with the dump sections.
    pub redirect_stdout_to: Option<PathBuf>,
}

/// A generated wrapper program plus the delimiters embedded in it.
///
/// Opaque to callers; the text and delimiters are only meaningful to the
/// executor/parser pair within a single invocation.
#[derive(Debug, Clone)]
pub struct WrapperProgram {
    text: String,
    delimiters: Delimiters,
}

impl WrapperProgram {
    /// Generate the wrapper program for one invocation.
    ///
    /// The script path and every argument are quoted so embedded whitespace
    /// and shell metacharacters pass through verbatim.
    pub fn build(
        config: &ShellConfig,
        script: &Path,
        args: &[String],
        options: &BuildOptions,
    ) -> Result<WrapperProgram> {
        let delimiters = Delimiters {
            env: delimiter_token("ENV"),
            locals: (!options.ignore_locals).then(|| delimiter_token("LOCALS")),
            exit: delimiter_token("EXIT"),
        };

        // Stash the sourced script's status first; the dump commands below
        // would overwrite the live $?-equivalent.
        let mut dump = vec![config.render_declare(RC_VAR, &config.prev_exit_code)?];
        // Terminate any partial line the script left on stdout so the first
        // delimiter starts a line of its own.
        dump.push("echo".to_string());
        dump.push(format!("echo {}", delimiters.env));
        dump.push(config.dump_env.clone());
        if let Some(locals_token) = &delimiters.locals {
            dump.push(format!("echo {}", locals_token));
            dump.push(config.dump_all_vars.clone());
        }
        dump.push(format!("echo {}", delimiters.exit));
        dump.push(format!("echo {}", config.render_interpolate(RC_VAR)?));

        let mut source_line =
            config.render_source(&shell_words::quote(&script.to_string_lossy()))?;
        for arg in args {
            source_line.push(' ');
            source_line.push_str(&shell_words::quote(arg));
        }
        if let Some(target) = &options.redirect_stdout_to {
            source_line = config.render_redirect(
                &source_line,
                &shell_words::quote(&target.to_string_lossy()),
            )?;
        }

        let text = match config.render_trap(&dump.join("; "))? {
            Some(trap_line) => format!("{}\n{}\n", trap_line, source_line),
            None => {
                let mut lines = Vec::with_capacity(dump.len() + 1);
                lines.push(source_line);
                lines.extend(dump);
                let mut text = lines.join("\n");
                text.push('\n');
                text
            }
        };

        Ok(WrapperProgram { text, delimiters })
    }

    /// The program text to hand to the interpreter.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The delimiter tokens embedded in the program.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }
}

fn delimiter_token(tag: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("__SHELLVARS_{}_{}", tag, suffix)
}
