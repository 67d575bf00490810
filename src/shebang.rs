//! Shebang-line interpreter detection.
//!
//! When a request names no interpreter, the script's `#!` line picks one.
//! The returned command string may carry flags (`#!/bin/bash -e`) and is fed
//! through the same command-line splitting as an explicit shell argument;
//! `#!/usr/bin/env bash` resolves through the registry's env handling.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read the interpreter command from a script's first line.
///
/// Returns `None` when the script has no shebang or cannot be read; a truly
/// missing script surfaces later as a sourcing failure rather than here.
pub fn interpreter_for(script: &Path) -> Option<String> {
    let file = File::open(script).ok()?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line).ok()?;
    let command = first_line.strip_prefix("#!")?.trim();
    (!command.is_empty()).then(|| command.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn script_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn plain_shebang_is_returned_verbatim() {
        let script = script_with("#!/bin/bash\necho hi\n");
        assert_eq!(
            interpreter_for(script.path()),
            Some("/bin/bash".to_string())
        );
    }

    #[test]
    fn shebang_flags_are_preserved() {
        let script = script_with("#!/bin/bash -e -u\n");
        assert_eq!(
            interpreter_for(script.path()),
            Some("/bin/bash -e -u".to_string())
        );
    }

    #[test]
    fn env_shebang_is_preserved_for_registry_resolution() {
        let script = script_with("#!/usr/bin/env fish\n");
        assert_eq!(
            interpreter_for(script.path()),
            Some("/usr/bin/env fish".to_string())
        );
    }

    #[test]
    fn script_without_shebang_yields_none() {
        let script = script_with("FOO=bar\n");
        assert_eq!(interpreter_for(script.path()), None);
    }

    #[test]
    fn missing_file_yields_none() {
        assert_eq!(interpreter_for(Path::new("/no/such/script.sh")), None);
    }

    #[test]
    fn empty_shebang_yields_none() {
        let script = script_with("#!\n");
        assert_eq!(interpreter_for(script.path()), None);
    }
}
