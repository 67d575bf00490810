//! Tests for wrapper program generation.

use super::*;
use crate::dialect::ShellConfig;
use std::path::Path;

fn build(config: &ShellConfig, options: &BuildOptions) -> WrapperProgram {
    WrapperProgram::build(config, Path::new("/tmp/setup.sh"), &[], options).unwrap()
}

#[test]
fn delimiters_are_distinct_and_prefixed() {
    let program = build(&ShellConfig::posix(), &BuildOptions::default());
    let delims = program.delimiters();
    let locals = delims.locals.as_ref().unwrap();

    assert_ne!(delims.env, *locals);
    assert_ne!(delims.env, delims.exit);
    assert_ne!(*locals, delims.exit);
    assert!(delims.env.starts_with("__SHELLVARS_ENV_"));
    assert!(locals.starts_with("__SHELLVARS_LOCALS_"));
    assert!(delims.exit.starts_with("__SHELLVARS_EXIT_"));
}

#[test]
fn delimiters_differ_between_builds() {
    let first = build(&ShellConfig::posix(), &BuildOptions::default());
    let second = build(&ShellConfig::posix(), &BuildOptions::default());
    assert_ne!(first.delimiters().env, second.delimiters().env);
}

#[test]
fn posix_wrapper_registers_trap_before_sourcing() {
    let program = build(&ShellConfig::posix(), &BuildOptions::default());
    let lines: Vec<&str> = program.text().lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("trap '"));
    assert!(lines[0].ends_with("' EXIT"));
    assert!(lines[1].starts_with(". /tmp/setup.sh"));
    // Status stashed as the trap's first command, printed as its last.
    assert!(lines[0].contains("__shellvars_rc=$?;"));
    assert!(lines[0].contains("echo ${__shellvars_rc}"));
}

#[test]
fn posix_wrapper_dumps_env_then_locals() {
    let program = build(&ShellConfig::posix(), &BuildOptions::default());
    let text = program.text();
    let delims = program.delimiters();

    let env_pos = text.find(&delims.env).unwrap();
    let locals_pos = text.find(delims.locals.as_ref().unwrap()).unwrap();
    let exit_pos = text.find(&delims.exit).unwrap();
    assert!(env_pos < locals_pos && locals_pos < exit_pos);
    assert!(text.contains("; env;"));
    assert!(text.contains("; set;"));
}

#[test]
fn ignore_locals_skips_the_all_vars_section() {
    let options = BuildOptions {
        ignore_locals: true,
        ..Default::default()
    };
    let program = build(&ShellConfig::posix(), &options);

    assert!(program.delimiters().locals.is_none());
    assert!(!program.text().contains("; set;"));
    assert!(program.text().contains("; env;"));
}

#[test]
fn csh_wrapper_is_linear_and_stashes_status_after_sourcing() {
    let program = build(&ShellConfig::csh(), &BuildOptions::default());
    let lines: Vec<&str> = program.text().lines().collect();

    assert!(lines[0].starts_with("source /tmp/setup.sh"));
    assert_eq!(lines[1], "set __shellvars_rc=$status");
    assert!(!program.text().contains("trap"));
    assert_eq!(*lines.last().unwrap(), "echo ${__shellvars_rc}");
}

#[test]
fn arguments_with_whitespace_are_quoted() {
    let args = vec!["plain".to_string(), "two words".to_string(), "$HOME".to_string()];
    let program = WrapperProgram::build(
        &ShellConfig::posix(),
        Path::new("/tmp/setup.sh"),
        &args,
        &BuildOptions::default(),
    )
    .unwrap();

    assert!(program.text().contains(". /tmp/setup.sh plain 'two words' '$HOME'"));
}

#[test]
fn script_path_with_spaces_is_quoted() {
    let program = WrapperProgram::build(
        &ShellConfig::posix(),
        Path::new("/tmp/my scripts/setup.sh"),
        &[],
        &BuildOptions::default(),
    )
    .unwrap();

    assert!(program.text().contains(". '/tmp/my scripts/setup.sh'"));
}

#[test]
fn redirect_stdout_wraps_the_source_command() {
    let options = BuildOptions {
        ignore_locals: false,
        redirect_stdout_to: Some("/dev/null".into()),
    };
    let program = build(&ShellConfig::posix(), &options);

    assert!(program.text().contains(". /tmp/setup.sh >> /dev/null"));
}

#[test]
fn fish_wrapper_uses_fish_syntax() {
    let program = build(&ShellConfig::fish(), &BuildOptions::default());
    let text = program.text();

    assert!(text.contains("set __shellvars_rc $status;"));
    assert!(text.contains("echo $__shellvars_rc"));
    assert!(text.contains("source /tmp/setup.sh"));
}
