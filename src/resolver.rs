//! Merging and filtering of parsed variable maps.
//!
//! Locals overlay the environment because a local assignment reflects the
//! most specific scope the script touched; a collision keeps the
//! environment's position in the map but takes the local value.

use crate::VariableMap;
use crate::wrapper::INTERNAL_PREFIX;
use std::collections::BTreeSet;

/// Merge the environment and all-variables dumps into the final mapping.
///
/// Wrapper-internal bookkeeping variables are dropped. When `requested` is
/// given, only those names are kept; a requested name the script never set
/// is simply absent from the result, not an error — absence is the caller's
/// signal.
pub fn resolve(
    env: VariableMap,
    locals: Option<VariableMap>,
    requested: Option<&BTreeSet<String>>,
) -> VariableMap {
    let mut merged = env;
    if let Some(locals) = locals {
        for (name, value) in locals {
            merged.insert(name, value);
        }
    }
    merged.retain(|name, _| !name.starts_with(INTERNAL_PREFIX));
    if let Some(requested) = requested {
        merged.retain(|name, _| requested.contains(name));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> VariableMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn names(set: &[&str]) -> BTreeSet<String> {
        set.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn locals_supplement_the_environment() {
        let env = map(&[("HOME", "/home/user")]);
        let locals = map(&[("HOME", "/home/user"), ("local_var", "x")]);

        let result = resolve(env, Some(locals), None);

        assert_eq!(result.len(), 2);
        assert_eq!(result["HOME"], "/home/user");
        assert_eq!(result["local_var"], "x");
    }

    #[test]
    fn locals_take_precedence_on_collision() {
        let env = map(&[("LANG", "C")]);
        let locals = map(&[("LANG", "en_US.UTF-8")]);

        let result = resolve(env, Some(locals), None);

        assert_eq!(result["LANG"], "en_US.UTF-8");
    }

    #[test]
    fn collision_keeps_the_environment_position() {
        let env = map(&[("A", "1"), ("B", "2")]);
        let locals = map(&[("B", "20"), ("C", "3")]);

        let result = resolve(env, Some(locals), None);

        let keys: Vec<&str> = result.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["A", "B", "C"]);
        assert_eq!(result["B"], "20");
    }

    #[test]
    fn missing_locals_leave_env_untouched() {
        let env = map(&[("PATH", "/bin")]);
        let result = resolve(env.clone(), None, None);
        assert_eq!(result, env);
    }

    #[test]
    fn requested_filter_keeps_only_named_variables() {
        let env = map(&[("A", "1"), ("B", "2"), ("C", "3")]);

        let result = resolve(env, None, Some(&names(&["A", "C"])));

        assert_eq!(result.len(), 2);
        assert!(result.contains_key("A"));
        assert!(result.contains_key("C"));
    }

    #[test]
    fn absent_requested_name_is_omitted_not_an_error() {
        let env = map(&[("A", "1")]);

        let result = resolve(env, None, Some(&names(&["A", "MISSING"])));

        assert_eq!(result.len(), 1);
        assert!(!result.contains_key("MISSING"));
    }

    #[test]
    fn wrapper_internal_names_are_dropped() {
        let locals = map(&[("__shellvars_rc", "0"), ("kept", "yes")]);

        let result = resolve(VariableMap::new(), Some(locals), None);

        assert_eq!(result.len(), 1);
        assert_eq!(result["kept"], "yes");
    }
}
