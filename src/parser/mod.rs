//! Delimited dump parsing.
//!
//! A single pass over captured stdout with four states: everything before
//! the environment delimiter is preamble (the script's own output,
//! discarded), then the environment dump, then the all-variables dump
//! (absent when locals are ignored), then the exit-status line.
//!
//! Within a dump block, records are `name<separator>value` lines. A value
//! may span lines when the dialect's dump command quoted it; the scanner
//! tracks the dialect's quoting convention to tell an open quoted value from
//! a new record, and strips exactly one quoting layer while decoding.
//! Unquoted dumps (`env`) instead treat stray lines as raw newline
//! continuations of the previous value.


use crate::VariableMap;
use crate::dialect::{QuoteStyle, ShellConfig};
use crate::error::{Result, SourceError};
use crate::wrapper::Delimiters;
use regex::Regex;

/// The three decoded regions of a wrapper run.
#[derive(Debug)]
pub struct ParsedDump {
    /// Process environment variables.
    pub env: VariableMap,
    /// Every variable visible in the shell's scope (a superset of `env` by
    /// shell semantics); `None` when the wrapper skipped the section.
    pub locals: Option<VariableMap>,
    /// The sourced script's exit status.
    pub exit_code: i32,
}

enum State {
    Preamble,
    EnvBlock,
    LocalsBlock,
    ExitBlock,
}

/// Scan captured stdout into its three regions and decode each one.
///
/// Fails atomically: either a complete `ParsedDump` or a
/// [`SourceError::Parse`] — no partial results.
pub fn parse_dump(
    stdout: &str,
    delimiters: &Delimiters,
    config: &ShellConfig,
) -> Result<ParsedDump> {
    let mut state = State::Preamble;
    let mut env_lines: Vec<&str> = Vec::new();
    let mut locals_lines: Vec<&str> = Vec::new();
    let mut exit_line: Option<&str> = None;

    for raw in stdout.lines() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        match state {
            State::Preamble => {
                if line == delimiters.env {
                    state = State::EnvBlock;
                }
            }
            State::EnvBlock => {
                if delimiters.locals.as_deref() == Some(line) {
                    state = State::LocalsBlock;
                } else if line == delimiters.exit {
                    if delimiters.locals.is_some() {
                        return Err(SourceError::Parse(
                            "all-variables delimiter missing before exit delimiter".to_string(),
                        ));
                    }
                    state = State::ExitBlock;
                } else {
                    env_lines.push(line);
                }
            }
            State::LocalsBlock => {
                if line == delimiters.exit {
                    state = State::ExitBlock;
                } else {
                    locals_lines.push(line);
                }
            }
            State::ExitBlock => {
                if exit_line.is_none() && !line.trim().is_empty() {
                    exit_line = Some(line);
                }
            }
        }
    }

    match state {
        State::Preamble => {
            return Err(SourceError::Parse(
                "environment delimiter not found in interpreter output".to_string(),
            ));
        }
        State::EnvBlock | State::LocalsBlock => {
            return Err(SourceError::Parse(
                "exit delimiter not found in interpreter output".to_string(),
            ));
        }
        State::ExitBlock => {}
    }

    let env = parse_block(&env_lines, &config.env_separators, config.env_quoting)?;
    let locals = match &delimiters.locals {
        Some(_) => Some(parse_block(
            &locals_lines,
            &config.locals_separators,
            config.locals_quoting,
        )?),
        None => None,
    };

    let exit_line = exit_line
        .ok_or_else(|| SourceError::Parse("exit status line missing".to_string()))?;
    let exit_code = exit_line.trim().parse::<i32>().map_err(|_| {
        SourceError::Parse(format!("invalid exit status line '{}'", exit_line.trim()))
    })?;

    Ok(ParsedDump {
        env,
        locals,
        exit_code,
    })
}

fn parse_block(lines: &[&str], separators: &str, quoting: QuoteStyle) -> Result<VariableMap> {
    let record_start = record_regex(separators)?;
    let mut map = VariableMap::new();
    match quoting {
        QuoteStyle::Single => parse_quoted_block(lines, &record_start, &mut map)?,
        QuoteStyle::None => parse_raw_block(lines, &record_start, &mut map),
    }
    Ok(map)
}

/// `^name<separator>rest` with the dialect's separator set as a character
/// class.
fn record_regex(separators: &str) -> Result<Regex> {
    let mut class = String::new();
    for ch in separators.chars() {
        if matches!(ch, ']' | '^' | '-' | '\\') {
            class.push('\\');
        }
        class.push(ch);
    }
    let pattern = format!(r"^([A-Za-z_][A-Za-z0-9_]*)[{}](.*)$", class);
    Regex::new(&pattern).map_err(|e| {
        SourceError::Parse(format!(
            "invalid record separators '{}': {}",
            separators.escape_debug(),
            e
        ))
    })
}

/// Records with unquoted values: stray lines are raw newline continuations.
fn parse_raw_block(lines: &[&str], record_start: &Regex, map: &mut VariableMap) {
    for line in lines {
        if let Some(caps) = record_start.captures(line) {
            map.insert(caps[1].to_string(), caps[2].to_string());
        } else if map.is_empty() {
            tracing::warn!(line = %line, "ignoring dump line before any record");
        } else if let Some((_, value)) = map.get_index_mut(map.len() - 1) {
            value.push('\n');
            value.push_str(line);
        }
    }
}

/// Records whose values carry one layer of shell quoting. A quote left open
/// at end of line continues the record; stray unquoted lines (e.g. function
/// listings in `set` output) are skipped.
fn parse_quoted_block(
    lines: &[&str],
    record_start: &Regex,
    map: &mut VariableMap,
) -> Result<()> {
    let mut open: Option<OpenRecord> = None;

    for line in lines {
        match open.take() {
            Some(mut record) => {
                record.scanner.feed('\n', &mut record.value);
                for ch in line.chars() {
                    record.scanner.feed(ch, &mut record.value);
                }
                open = record.close_into(map);
            }
            None => {
                if let Some(caps) = record_start.captures(line) {
                    let mut record = OpenRecord {
                        name: caps[1].to_string(),
                        value: String::new(),
                        scanner: QuoteScanner::new(),
                    };
                    for ch in caps[2].chars() {
                        record.scanner.feed(ch, &mut record.value);
                    }
                    open = record.close_into(map);
                } else {
                    tracing::debug!(line = %line, "skipping non-record dump line");
                }
            }
        }
    }

    if let Some(record) = open {
        return Err(SourceError::Parse(format!(
            "unterminated quoted value for variable '{}'",
            record.name
        )));
    }
    Ok(())
}

struct OpenRecord {
    name: String,
    value: String,
    scanner: QuoteScanner,
}

impl OpenRecord {
    /// Finalize into `map` if all quotes are closed, otherwise hand the
    /// record back to continue on the next line.
    fn close_into(mut self, map: &mut VariableMap) -> Option<OpenRecord> {
        if self.scanner.is_open() {
            Some(self)
        } else {
            self.scanner.finish(&mut self.value);
            map.insert(self.name, self.value);
            None
        }
    }
}

enum QState {
    Bare,
    /// Saw `$` in bare context; decides between `$'...'` and a literal `$`.
    Dollar,
    Single,
    AnsiC,
    BareEscape,
    AnsiCEscape,
}

/// Incremental decoder for POSIX single-quote and `$'...'` ANSI-C quoting,
/// stripping exactly one layer.
struct QuoteScanner {
    state: QState,
}

impl QuoteScanner {
    fn new() -> Self {
        QuoteScanner {
            state: QState::Bare,
        }
    }

    fn feed(&mut self, ch: char, out: &mut String) {
        match self.state {
            QState::Bare => match ch {
                '\'' => self.state = QState::Single,
                '\\' => self.state = QState::BareEscape,
                '$' => self.state = QState::Dollar,
                _ => out.push(ch),
            },
            QState::Dollar => {
                if ch == '\'' {
                    self.state = QState::AnsiC;
                } else {
                    out.push('$');
                    self.state = QState::Bare;
                    self.feed(ch, out);
                }
            }
            QState::Single => match ch {
                '\'' => self.state = QState::Bare,
                _ => out.push(ch),
            },
            QState::AnsiC => match ch {
                '\'' => self.state = QState::Bare,
                '\\' => self.state = QState::AnsiCEscape,
                _ => out.push(ch),
            },
            QState::BareEscape => {
                // Backslash-newline is a line continuation and emits nothing.
                if ch != '\n' {
                    out.push(ch);
                }
                self.state = QState::Bare;
            }
            QState::AnsiCEscape => {
                out.push(ansi_c_escape(ch));
                self.state = QState::AnsiC;
            }
        }
    }

    /// Whether a quote (or a pending escape) is still open, meaning the
    /// record continues on the next physical line.
    fn is_open(&self) -> bool {
        matches!(
            self.state,
            QState::Single | QState::AnsiC | QState::AnsiCEscape | QState::BareEscape
        )
    }

    /// Flush any pending lone `$` at end of record.
    fn finish(&mut self, out: &mut String) {
        if matches!(self.state, QState::Dollar) {
            out.push('$');
            self.state = QState::Bare;
        }
    }
}

fn ansi_c_escape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0C',
        'v' => '\x0B',
        'e' => '\x1B',
        other => other,
    }
}
