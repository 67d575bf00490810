//! Exit code constants for the shellvars CLI.
//!
//! The sourced script's own exit status is reported as data, never as the
//! CLI's exit status. These codes describe the sourcing machinery itself:
//! - 0: Success
//! - 1: Configuration error (unknown dialect, bad template)
//! - 2: Interpreter not found
//! - 3: Execution failure (spawn error, timeout, signal)
//! - 4: Parse failure (malformed variable dump)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Configuration error: unresolvable dialect or invalid template.
pub const CONFIGURATION_ERROR: i32 = 1;

/// Interpreter executable missing.
pub const INTERPRETER_NOT_FOUND: i32 = 2;

/// Execution failure: spawn error, timeout, or termination by signal.
pub const EXECUTION_FAILURE: i32 = 3;

/// Parse failure: malformed or truncated variable dump.
pub const PARSE_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            CONFIGURATION_ERROR,
            INTERPRETER_NOT_FOUND,
            EXECUTION_FAILURE,
            PARSE_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
