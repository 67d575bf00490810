//! Sourcing orchestration.
//!
//! Ties the pipeline together: dialect lookup, wrapper generation,
//! interpreter execution, dump parsing, and resolution into the final
//! mapping. Each invocation is independent and stateless; concurrent calls
//! are safe because every call owns its own wrapper, delimiter tokens,
//! subprocess, and temp files.


use crate::VariableMap;
use crate::dialect::{self, ShellConfig};
use crate::error::{Result, SourceError};
use crate::exec::Executor;
use crate::parser;
use crate::resolver;
use crate::shebang;
use crate::wrapper::{BuildOptions, WrapperProgram};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The result of sourcing a script.
#[derive(Debug)]
pub struct SourceOutcome {
    /// The merged, filtered variable mapping.
    pub variables: VariableMap,
    /// The sourced script's own exit status. Non-zero is data, not an
    /// error: a failing script routinely still sets variables worth
    /// retrieving.
    pub exit_code: i32,
}

/// A configured sourcing invocation, built fluently and consumed by
/// [`SourceRequest::run`].
///
/// ```no_run
/// use shellvars::SourceRequest;
///
/// let outcome = SourceRequest::new("./env.sh")
///     .shell("bash")
///     .arg("--profile=ci")
///     .variable("BUILD_DIR")
///     .run()?;
/// # Ok::<(), shellvars::SourceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SourceRequest {
    script: PathBuf,
    shell: Option<String>,
    args: Vec<String>,
    variables: Option<BTreeSet<String>>,
    ignore_locals: bool,
    shell_config: Option<ShellConfig>,
    timeout: Option<Duration>,
    redirect_stdout_to: Option<PathBuf>,
}

impl SourceRequest {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        SourceRequest {
            script: script.into(),
            shell: None,
            args: Vec::new(),
            variables: None,
            ignore_locals: false,
            shell_config: None,
            timeout: None,
            redirect_stdout_to: None,
        }
    }

    /// Interpreter command line, e.g. `"bash"` or `"/bin/zsh -f"`. Defaults
    /// to the script's shebang line, then `sh`.
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    /// Append one argument passed to the sourced script.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments passed to the sourced script.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Restrict the result to one named variable (repeatable). Without any,
    /// everything observed is returned.
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.variables
            .get_or_insert_with(BTreeSet::new)
            .insert(name.into());
        self
    }

    /// Restrict the result to a set of variable names.
    pub fn variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = self.variables.get_or_insert_with(BTreeSet::new);
        set.extend(names.into_iter().map(Into::into));
        self
    }

    /// Skip shell-local variables; only the process environment is dumped
    /// and returned.
    pub fn ignore_locals(mut self, ignore: bool) -> Self {
        self.ignore_locals = ignore;
        self
    }

    /// Use an explicit dialect profile instead of registry lookup. Required
    /// for shells the registry does not know.
    pub fn shell_config(mut self, config: ShellConfig) -> Self {
        self.shell_config = Some(config);
        self
    }

    /// Kill the interpreter and fail with [`SourceError::Execution`] if it
    /// runs longer than this (e.g. a script that waits on input).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Redirect the sourced script's own stdout into a file (or
    /// `/dev/null`) so it cannot interleave with the dump capture.
    pub fn redirect_stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.redirect_stdout_to = Some(path.into());
        self
    }

    /// Source the script and collect its resulting variables.
    pub fn run(self) -> Result<SourceOutcome> {
        // POSIX `.` searches PATH for a relative operand instead of the
        // working directory; an absolute path means the same script
        // everywhere.
        let script = std::path::absolute(&self.script).unwrap_or_else(|_| self.script.clone());
        let shell_command = match &self.shell {
            Some(shell) => shell.clone(),
            None => shebang::interpreter_for(&script).unwrap_or_else(|| "sh".to_string()),
        };
        let interpreter = shell_words::split(&shell_command).map_err(|e| {
            SourceError::Configuration(format!(
                "failed to parse shell command '{}': {}",
                shell_command, e
            ))
        })?;
        if interpreter.is_empty() {
            return Err(SourceError::Configuration(
                "shell command is empty".to_string(),
            ));
        }

        let config = match self.shell_config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => dialect::resolve(&dialect::dialect_from_command(&shell_command)?)?,
        };

        let options = BuildOptions {
            ignore_locals: self.ignore_locals,
            redirect_stdout_to: self.redirect_stdout_to,
        };
        let program = WrapperProgram::build(&config, &script, &self.args, &options)?;

        tracing::debug!(
            shell = %shell_command,
            script = %script.display(),
            "sourcing script"
        );
        tracing::trace!(program = %program.text(), "generated wrapper program");

        let result =
            Executor::with_timeout(self.timeout).run(&interpreter, &program, config.pipe_stdin)?;
        if !result.stderr.is_empty() {
            tracing::debug!(stderr = %result.stderr.trim_end(), "interpreter stderr");
        }

        let parsed = parser::parse_dump(&result.stdout, program.delimiters(), &config)
            .map_err(|e| attach_stderr(e, &result.stderr))?;

        let variables = resolver::resolve(parsed.env, parsed.locals, self.variables.as_ref());
        Ok(SourceOutcome {
            variables,
            exit_code: parsed.exit_code,
        })
    }
}

/// Source a script with defaults (shebang-or-`sh` interpreter, all
/// variables, locals included) and return the mapping.
pub fn source(script: impl AsRef<Path>) -> Result<VariableMap> {
    SourceRequest::new(script.as_ref())
        .run()
        .map(|outcome| outcome.variables)
}

/// A parse failure usually means the interpreter rejected the wrapper or
/// script; its stderr is the actionable part.
fn attach_stderr(err: SourceError, stderr: &str) -> SourceError {
    match err {
        SourceError::Parse(msg) if !stderr.trim().is_empty() => {
            let excerpt: String = stderr.trim().chars().take(200).collect();
            SourceError::Parse(format!("{}; interpreter stderr: {}", msg, excerpt))
        }
        other => other,
    }
}
