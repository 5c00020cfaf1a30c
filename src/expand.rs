//! Variable interpolation: rewrites `${NAME}` references against the
//! environment before a line is tokenized.

use std::sync::OnceLock;

use regex::Regex;

use crate::env::Environment;
use crate::error::SyntaxError;

fn brace_ref() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid pattern"))
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid pattern"))
}

/// Whether `name` is a valid shell variable name.
///
/// A letter or underscore followed by letters, digits or underscores. No
/// trimming is applied, so `${ NAME }` is rejected rather than cleaned up.
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// Replace every `${NAME}` occurrence in `line` with its environment value.
///
/// A backslash immediately before `${` escapes the reference: the backslash
/// is dropped and the `${NAME}` text is kept verbatim without a lookup.
/// Unset variables expand to the empty string. The scan is a single
/// left-to-right pass; replacement values are never re-expanded.
///
/// An invalid name fails the whole line: no partial result is produced and
/// the caller abandons the command cycle.
pub fn interpolate(line: &str, env: &Environment) -> Result<String, SyntaxError> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for caps in brace_ref().captures_iter(line) {
        let whole = caps.get(0).expect("group 0 always present");
        let name = &caps[1];
        let escaped = whole.start() > 0 && line.as_bytes()[whole.start() - 1] == b'\\';

        if escaped {
            out.push_str(&line[last..whole.start() - 1]);
            out.push_str(whole.as_str());
        } else if is_valid_name(name) {
            out.push_str(&line[last..whole.start()]);
            out.push_str(&env.get_var(name).unwrap_or_default());
        } else {
            return Err(SyntaxError::InvalidVariableName(name.to_string()));
        }
        last = whole.end();
    }

    out.push_str(&line[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(name: &str, value: &str) -> Environment {
        let mut env = Environment::new();
        env.set_var(name, value);
        env
    }

    #[test]
    fn round_trips_a_set_variable() {
        let env = env_with("NAME", "some value");
        assert_eq!(interpolate("${NAME}", &env).unwrap(), "some value");
    }

    #[test]
    fn substitutes_in_context() {
        let env = env_with("USER", "alice");
        assert_eq!(
            interpolate("echo hello ${USER}!", &env).unwrap(),
            "echo hello alice!"
        );
    }

    #[test]
    fn unset_variable_becomes_empty() {
        let env = Environment::new();
        assert_eq!(
            interpolate("a${NO_SUCH_VARIABLE_XYZ}b", &env).unwrap(),
            "ab"
        );
    }

    #[test]
    fn escaped_reference_is_literal() {
        let env = env_with("NAME", "value");
        assert_eq!(interpolate(r"\${NAME}", &env).unwrap(), "${NAME}");
    }

    #[test]
    fn invalid_name_fails_whole_line() {
        let env = Environment::new();
        let err = interpolate("echo ${1BAD} tail", &env).unwrap_err();
        assert_eq!(err, SyntaxError::InvalidVariableName("1BAD".to_string()));
    }

    #[test]
    fn whitespace_in_name_is_rejected_not_trimmed() {
        let env = env_with("NAME", "value");
        assert!(interpolate("${ NAME }", &env).is_err());
    }

    #[test]
    fn replacement_is_not_reexpanded() {
        let mut env = Environment::new();
        env.set_var("A", "${B}");
        env.set_var("B", "nested");
        assert_eq!(interpolate("${A}", &env).unwrap(), "${B}");
    }

    #[test]
    fn multiple_references_in_one_pass() {
        let mut env = Environment::new();
        env.set_var("A", "1");
        env.set_var("B", "2");
        assert_eq!(interpolate("${A}:${B}:${A}", &env).unwrap(), "1:2:1");
    }

    #[test]
    fn empty_braces_are_left_alone() {
        let env = Environment::new();
        assert_eq!(interpolate("${}", &env).unwrap(), "${}");
    }
}
