//! `${VAR}` expansion for configuration strings.

use crate::ConfigError;

/// Failed lookup of one variable.
struct Unset {
    name: String,
}

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is left as is. `field` names the config key in errors.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| -> Result<Option<String>, Unset> {
        std::env::var(name).map(Some).map_err(|_| Unset {
            name: name.to_owned(),
        })
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("HT_EXPAND_SET", "ghp_secret");
        }
        assert_eq!(
            expand_env("${HT_EXPAND_SET}", "github.token").unwrap(),
            "ghp_secret"
        );
        unsafe {
            std::env::remove_var("HT_EXPAND_SET");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("HT_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${HT_EXPAND_UNSET:-https://api.github.com}", "github.api_url").unwrap(),
            "https://api.github.com"
        );
    }

    #[test]
    fn test_expand_embedded() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("HT_EXPAND_HOST", "github.example.com");
        }
        assert_eq!(
            expand_env("https://${HT_EXPAND_HOST}/api/v3", "github.api_url").unwrap(),
            "https://github.example.com/api/v3"
        );
        unsafe {
            std::env::remove_var("HT_EXPAND_HOST");
        }
    }

    #[test]
    fn test_missing_var_names_field_and_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("HT_EXPAND_MISSING");
        }
        let err = expand_env("${HT_EXPAND_MISSING}", "github.token").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("HT_EXPAND_MISSING"));
        assert!(err.to_string().contains("github.token"));
    }

    #[test]
    fn test_literals_unchanged() {
        assert_eq!(expand_env("plain", "github.token").unwrap(), "plain");
        assert_eq!(expand_env("$NOT_BRACED", "github.token").unwrap(), "$NOT_BRACED");
    }
}
