//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// `${VAR}` fails when VAR is unset; `${VAR:-default}` falls back to the
/// default. Bare `$VAR` is left alone.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| match std::env::var(var) {
        Ok(val) => Ok(Some(val)),
        Err(_) => Err(UnsetVar(var.to_owned())),
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Lookup failure carrying the variable name.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TAGKIT_TEST_VIEWS", "/srv/views");
        }
        let result = expand_env("${TAGKIT_TEST_VIEWS}/shared", "partials.root").unwrap();
        assert_eq!(result, "/srv/views/shared");
        unsafe {
            std::env::remove_var("TAGKIT_TEST_VIEWS");
        }
    }

    #[test]
    fn test_expand_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TAGKIT_TEST_UNSET");
        }
        let result = expand_env("${TAGKIT_TEST_UNSET:-views}", "partials.root").unwrap();
        assert_eq!(result, "views");
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TAGKIT_TEST_MISSING");
        }
        let err = expand_env("${TAGKIT_TEST_MISSING}", "partials.root").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("TAGKIT_TEST_MISSING"));
        assert!(msg.contains("partials.root"));
    }

    #[test]
    fn test_bare_dollar_unchanged() {
        assert_eq!(expand_env("views/$theme", "partials.root").unwrap(), "views/$theme");
    }
}
