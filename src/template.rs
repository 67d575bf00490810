//! `{name}` placeholder substitution for shell command templates.
//!
//! Dialect profiles describe shell commands as string templates
//! (`". {script}"`, `"${{{var}}}"`, ...). This module expands them against a
//! small fixed vocabulary of placeholder names. `{{` and `}}` render as
//! literal braces, which is how a POSIX interpolation template spells `${x}`.
//!
//! The engine is fail-fast: an undefined placeholder is an error rather than
//! a silent empty substitution, so a typo in a custom dialect profile
//! surfaces immediately.

use thiserror::Error;

/// Error type for template rendering failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder was referenced but not provided.
    #[error("undefined placeholder '{{{name}}}' in template '{template}'")]
    UndefinedPlaceholder { name: String, template: String },

    /// A `{` was found without a matching `}`.
    #[error("unmatched '{{' in template '{template}'")]
    UnmatchedBrace { template: String },

    /// An empty placeholder name was found (`{}`).
    #[error("empty placeholder '{{}}' in template '{template}'")]
    EmptyPlaceholder { template: String },
}

/// Render a template by substituting `{name}` placeholders from `vars`.
///
/// `vars` is a slice of `(name, value)` pairs; templates here never have more
/// than two placeholders, so a map is not worth building.
///
/// # Examples
///
/// ```
/// use shellvars::template::render;
///
/// let cmd = render("{cmd} >> {file}", &[("cmd", "env"), ("file", "/tmp/vars")]).unwrap();
/// assert_eq!(cmd, "env >> /tmp/vars");
///
/// // `{{`/`}}` escape to literal braces:
/// let deref = render("${{{var}}}", &[("var", "FOO")]).unwrap();
/// assert_eq!(deref, "${FOO}");
/// ```
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if let Some('{') = chars.peek() {
                    chars.next();
                    result.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(TemplateError::UnmatchedBrace {
                                template: template.to_string(),
                            });
                        }
                    }
                }
                if name.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder {
                        template: template.to_string(),
                    });
                }
                match vars.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => result.push_str(value),
                    None => {
                        return Err(TemplateError::UndefinedPlaceholder {
                            name,
                            template: template.to_string(),
                        });
                    }
                }
            }
            '}' => {
                if let Some('}') = chars.peek() {
                    chars.next();
                }
                result.push('}');
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_substitution() {
        let result = render("source {script}", &[("script", "/tmp/env.sh")]).unwrap();
        assert_eq!(result, "source /tmp/env.sh");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(render("env", &[]).unwrap(), "env");
    }

    #[test]
    fn two_placeholders() {
        let result = render("{cmd} >> {file}", &[("cmd", "set"), ("file", "vars")]).unwrap();
        assert_eq!(result, "set >> vars");
    }

    #[test]
    fn escaped_braces_render_literally() {
        let result = render("${{{var}}}", &[("var", "PATH")]).unwrap();
        assert_eq!(result, "${PATH}");
    }

    #[test]
    fn lone_closing_brace_is_literal() {
        assert_eq!(render("a } b", &[]).unwrap(), "a } b");
    }

    #[test]
    fn undefined_placeholder_is_an_error() {
        let err = render("echo {missing}", &[("var", "x")]).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UndefinedPlaceholder { ref name, .. } if name == "missing"
        ));
    }

    #[test]
    fn unmatched_brace_is_an_error() {
        let err = render("echo {var", &[("var", "x")]).unwrap_err();
        assert!(matches!(err, TemplateError::UnmatchedBrace { .. }));
    }

    #[test]
    fn empty_placeholder_is_an_error() {
        let err = render("echo {}", &[]).unwrap_err();
        assert!(matches!(err, TemplateError::EmptyPlaceholder { .. }));
    }

    #[test]
    fn value_containing_braces_is_not_reparsed() {
        let result = render("{value}", &[("value", "a{b}c")]).unwrap();
        assert_eq!(result, "a{b}c");
    }
}
