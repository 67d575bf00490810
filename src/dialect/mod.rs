//! Shell dialect profiles and the dialect registry.
//!
//! A [`ShellConfig`] is a pure data record of string templates describing how
//! one shell dialect spells the handful of commands the wrapper program
//! needs: sourcing a script, declaring a variable, dumping the environment,
//! dumping all visible variables, and reporting the previous exit status.
//! Adding a dialect is a data change, not a code change.
//!
//! Profiles are serde-(de)serializable so a custom dialect can be loaded
//! from a YAML file and passed to [`crate::SourceRequest::shell_config`].


use crate::error::{Result, SourceError};
use crate::template::{self, TemplateError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a dump command quotes the values it prints.
///
/// The output parser uses this to decide whether a line continues an open
/// quoted value and how many quoting layers to strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// POSIX single-quote quoting, plus `$'...'` ANSI-C quoting, as printed
    /// by `set` in Bourne-family shells. One layer is stripped on decode.
    Single,
    /// Values are printed raw with no quoting (`env`, csh `set`). Nothing is
    /// stripped; raw newlines continue the previous record.
    None,
}

/// Command templates and parsing hints for one shell dialect.
///
/// All command fields are string templates with `{name}` placeholders
/// expanded by [`crate::template`]; every template is a pure string
/// transform, so one `ShellConfig` is reusable across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// How to source a `{script}` in the current shell session.
    pub source_cmd: String,

    /// How to dereference a variable named `{var}`.
    pub interpolate: String,

    /// How to redirect the stdout of `{cmd}` to `{file}`.
    pub redirect_stdout: String,

    /// How to declare a variable `{var}` with value `{value}`.
    pub declare: String,

    /// Command that enumerates process environment variables, one
    /// `name=value` record per line.
    pub dump_env: String,

    /// Command that enumerates every variable visible in the shell's scope,
    /// a superset of the environment.
    pub dump_all_vars: String,

    /// Expression yielding the previous command's exit status.
    pub prev_exit_code: String,

    /// How to register `{cmd}` to run when the shell exits, or `None` for
    /// dialects without an EXIT trap (csh family). With a trap the variable
    /// dump survives a sourced script calling `exit`; without one the
    /// wrapper falls back to a linear layout and an exiting script skips
    /// the dump.
    pub trap_cmd: Option<String>,

    /// Whether the interpreter executes a program fed on stdin. When false
    /// the executor writes the wrapper to a uniquely-named temp file and
    /// passes its path as an argument instead.
    pub pipe_stdin: bool,

    /// Characters that may separate name from value in `dump_env` records.
    pub env_separators: String,

    /// Characters that may separate name from value in `dump_all_vars`
    /// records (`=` for Bourne-family `set`, tab for csh, space for fish).
    pub locals_separators: String,

    /// Quoting convention of `dump_env` output.
    pub env_quoting: QuoteStyle,

    /// Quoting convention of `dump_all_vars` output.
    pub locals_quoting: QuoteStyle,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::posix()
    }
}

fn cfg_err(e: TemplateError) -> SourceError {
    SourceError::Configuration(e.to_string())
}

impl ShellConfig {
    /// Profile shared by Bourne- and Korn-family shells: sh, bash, zsh, ksh,
    /// dash, ash.
    pub fn posix() -> Self {
        ShellConfig {
            source_cmd: ". {script}".to_string(),
            interpolate: "${{{var}}}".to_string(),
            redirect_stdout: "{cmd} >> {file}".to_string(),
            declare: "{var}={value}".to_string(),
            dump_env: "env".to_string(),
            dump_all_vars: "set".to_string(),
            prev_exit_code: "$?".to_string(),
            trap_cmd: Some("trap '{cmd}' EXIT".to_string()),
            pipe_stdin: true,
            env_separators: "=".to_string(),
            locals_separators: "=".to_string(),
            env_quoting: QuoteStyle::None,
            locals_quoting: QuoteStyle::Single,
        }
    }

    /// Profile for the C-shell family (csh, tcsh): `$status` instead of
    /// `$?`, `set name=value` declarations, tab-separated `set` output, and
    /// no EXIT trap.
    pub fn csh() -> Self {
        ShellConfig {
            source_cmd: "source {script}".to_string(),
            interpolate: "${{{var}}}".to_string(),
            redirect_stdout: "{cmd} >> {file}".to_string(),
            declare: "set {var}={value}".to_string(),
            dump_env: "env".to_string(),
            dump_all_vars: "set".to_string(),
            prev_exit_code: "$status".to_string(),
            trap_cmd: None,
            pipe_stdin: true,
            env_separators: "=".to_string(),
            locals_separators: "=\t".to_string(),
            env_quoting: QuoteStyle::None,
            locals_quoting: QuoteStyle::None,
        }
    }

    /// Profile for fish: `$status`, `set name value` declarations, and
    /// space-separated `set` output. fish rejects `${name}` interpolation,
    /// so the dereference template is a bare `$name`.
    pub fn fish() -> Self {
        ShellConfig {
            source_cmd: "source {script}".to_string(),
            interpolate: "${var}".to_string(),
            redirect_stdout: "{cmd} >> {file}".to_string(),
            declare: "set {var} {value}".to_string(),
            dump_env: "env".to_string(),
            dump_all_vars: "set".to_string(),
            prev_exit_code: "$status".to_string(),
            trap_cmd: Some("trap '{cmd}' EXIT".to_string()),
            pipe_stdin: true,
            env_separators: "=".to_string(),
            locals_separators: " =".to_string(),
            env_quoting: QuoteStyle::None,
            locals_quoting: QuoteStyle::Single,
        }
    }

    /// Load a profile from a YAML file. Fields absent from the file fall
    /// back to the POSIX profile's values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SourceError::Configuration(format!(
                "failed to read dialect profile '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a profile from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ShellConfig = serde_yaml::from_str(yaml).map_err(|e| {
            SourceError::Configuration(format!("failed to parse dialect profile YAML: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every template carries its required placeholders and that
    /// no required field is empty.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("source_cmd", &self.source_cmd, &["{script}"][..]),
            ("interpolate", &self.interpolate, &["{var}"][..]),
            (
                "redirect_stdout",
                &self.redirect_stdout,
                &["{cmd}", "{file}"][..],
            ),
            ("declare", &self.declare, &["{var}", "{value}"][..]),
        ];
        for (field, value, placeholders) in required {
            for placeholder in placeholders {
                if !value.contains(placeholder) {
                    return Err(SourceError::Configuration(format!(
                        "dialect template '{}' is missing the {} placeholder",
                        field, placeholder
                    )));
                }
            }
        }
        let non_empty = [
            ("dump_env", &self.dump_env),
            ("dump_all_vars", &self.dump_all_vars),
            ("prev_exit_code", &self.prev_exit_code),
            ("env_separators", &self.env_separators),
            ("locals_separators", &self.locals_separators),
        ];
        for (field, value) in non_empty {
            if value.is_empty() {
                return Err(SourceError::Configuration(format!(
                    "dialect field '{}' must not be empty",
                    field
                )));
            }
        }
        if let Some(trap) = &self.trap_cmd {
            if !trap.contains("{cmd}") {
                return Err(SourceError::Configuration(
                    "dialect template 'trap_cmd' is missing the {cmd} placeholder".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn render_source(&self, script: &str) -> Result<String> {
        template::render(&self.source_cmd, &[("script", script)]).map_err(cfg_err)
    }

    pub fn render_interpolate(&self, var: &str) -> Result<String> {
        template::render(&self.interpolate, &[("var", var)]).map_err(cfg_err)
    }

    pub fn render_redirect(&self, cmd: &str, file: &str) -> Result<String> {
        template::render(&self.redirect_stdout, &[("cmd", cmd), ("file", file)]).map_err(cfg_err)
    }

    pub fn render_declare(&self, var: &str, value: &str) -> Result<String> {
        template::render(&self.declare, &[("var", var), ("value", value)]).map_err(cfg_err)
    }

    pub fn render_trap(&self, cmd: &str) -> Result<Option<String>> {
        match &self.trap_cmd {
            Some(t) => Ok(Some(template::render(t, &[("cmd", cmd)]).map_err(cfg_err)?)),
            None => Ok(None),
        }
    }
}

/// Resolve a bare shell name to its builtin dialect profile.
///
/// Unrecognized names fail with [`SourceError::Configuration`] rather than
/// silently guessing; callers with an exotic shell pass an explicit
/// [`ShellConfig`] instead.
pub fn resolve(shell_name: &str) -> Result<ShellConfig> {
    match shell_name {
        "sh" | "bash" | "zsh" | "ksh" | "dash" | "ash" => Ok(ShellConfig::posix()),
        "csh" | "tcsh" => Ok(ShellConfig::csh()),
        "fish" => Ok(ShellConfig::fish()),
        other => Err(SourceError::Configuration(format!(
            "unknown shell dialect '{}'\n\
             Fix: pass an explicit dialect profile, or use one of: \
             sh, bash, zsh, ksh, dash, ash, csh, tcsh, fish.",
            other
        ))),
    }
}

/// Extract the dialect name from a full interpreter command line.
///
/// Strips the leading path and trailing flags, and looks through a leading
/// `env` launcher: `/usr/bin/env bash -x` resolves to `bash`.
pub fn dialect_from_command(command: &str) -> Result<String> {
    let tokens = shell_words::split(command).map_err(|e| {
        SourceError::Configuration(format!(
            "failed to parse shell command '{}': {}",
            command, e
        ))
    })?;

    let mut iter = tokens.iter();
    let first = iter.next().ok_or_else(|| {
        SourceError::Configuration("shell command is empty".to_string())
    })?;

    let name = base_name(first);
    if name == "env" {
        let target = iter.find(|t| !t.starts_with('-')).ok_or_else(|| {
            SourceError::Configuration(format!(
                "shell command '{}' names no interpreter after env",
                command
            ))
        })?;
        Ok(base_name(target))
    } else {
        Ok(name)
    }
}

fn base_name(token: &str) -> String {
    Path::new(token)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(token)
        .to_string()
}
