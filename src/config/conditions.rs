//! Evaluation of per-entry `conditions` (`os`, `env`, `php-version`).
use std::cell::OnceCell;

use serde_json::Value;

use crate::config::environment::Environment;
use crate::config::runtime::detect_php_version;
use crate::config::version::{Constraint, Version};
use crate::error::SymlinksError;
use crate::exec::Executor;
use crate::platform::Os;

/// Values a `true` env expectation accepts, compared case-insensitively.
const TRUTHY_ENV: [&str; 4] = ["1", "true", "yes", "on"];

/// Where the PHP version for `php-version` conditions comes from.
#[derive(Debug, Clone, Copy)]
enum PhpSource<'a> {
    Known(Option<Version>),
    Probe {
        explicit: Option<&'a str>,
        executor: &'a dyn Executor,
    },
}

/// Facts about the current run that conditions are checked against.
///
/// The PHP version is resolved on first use, so runs without a
/// `php-version` condition never spawn `php`.
#[derive(Debug, Clone)]
pub struct ConditionContext<'a> {
    /// Operating-system family.
    pub os: Os,
    /// Environment variable source.
    pub env: &'a dyn Environment,
    php_source: PhpSource<'a>,
    php_version: OnceCell<Option<Version>>,
}

impl<'a> ConditionContext<'a> {
    /// Create a context with an already known PHP version.
    #[must_use]
    pub const fn new(os: Os, env: &'a dyn Environment, php_version: Option<Version>) -> Self {
        Self {
            os,
            env,
            php_source: PhpSource::Known(php_version),
            php_version: OnceCell::new(),
        }
    }

    /// Create a context that detects the PHP version when a condition first
    /// asks for it.
    #[must_use]
    pub const fn probing(
        os: Os,
        env: &'a dyn Environment,
        explicit: Option<&'a str>,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            os,
            env,
            php_source: PhpSource::Probe { explicit, executor },
            php_version: OnceCell::new(),
        }
    }

    /// PHP runtime version, if one could be determined.
    #[must_use]
    pub fn php_version(&self) -> Option<Version> {
        *self.php_version.get_or_init(|| match self.php_source {
            PhpSource::Known(version) => version,
            PhpSource::Probe { explicit, executor } => {
                let version = detect_php_version(explicit, self.env, executor);
                match &version {
                    Some(v) => tracing::debug!("php version: {v}"),
                    None => tracing::debug!("php version: unknown"),
                }
                version
            }
        })
    }

    fn env_is_truthy(&self, name: &str) -> bool {
        self.env.var(name).is_some_and(|v| {
            let v = v.trim();
            TRUTHY_ENV.iter().any(|t| t.eq_ignore_ascii_case(v))
        })
    }
}

/// Evaluate a definition's `conditions` value.
///
/// `null` (absent) passes.  Every present category must pass; unknown
/// categories are ignored.
///
/// # Errors
///
/// Returns [`SymlinksError::InvalidArgument`] when a condition value has the
/// wrong shape or a version constraint cannot be parsed.
pub fn evaluate(conditions: &Value, ctx: &ConditionContext<'_>) -> Result<bool, SymlinksError> {
    let map = match conditions {
        Value::Null => return Ok(true),
        Value::Object(map) => map,
        Value::Array(items) if items.is_empty() => return Ok(true),
        _ => return Err(SymlinksError::invalid("The conditions option must be an object.")),
    };

    for (category, value) in map {
        let passed = match category.as_str() {
            "os" => os_matches(value, ctx)?,
            "env" => env_matches(value, ctx)?,
            "php-version" => php_version_matches(value, ctx)?,
            _ => true,
        };
        if !passed {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Accept a string or a list of strings.
fn string_list<'v>(value: &'v Value, what: &str) -> Result<Vec<&'v str>, SymlinksError> {
    let shape_error =
        || SymlinksError::invalid(format!("The {what} condition must be a string or a list of strings."));
    match value {
        Value::String(s) => Ok(vec![s.as_str()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(shape_error))
            .collect(),
        _ => Err(shape_error()),
    }
}

fn os_matches(value: &Value, ctx: &ConditionContext<'_>) -> Result<bool, SymlinksError> {
    Ok(string_list(value, "os")?
        .into_iter()
        .any(|name| ctx.os.matches(name)))
}

fn env_matches(value: &Value, ctx: &ConditionContext<'_>) -> Result<bool, SymlinksError> {
    if let Value::Object(expectations) = value {
        for (name, expected) in expectations {
            if !env_expectation(name, expected, ctx)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    Ok(string_list(value, "env")?
        .into_iter()
        .all(|name| ctx.env.var(name).is_some_and(|v| !v.is_empty())))
}

fn env_expectation(
    name: &str,
    expected: &Value,
    ctx: &ConditionContext<'_>,
) -> Result<bool, SymlinksError> {
    let actual = ctx.env.var(name);
    match expected {
        Value::Bool(true) => Ok(ctx.env_is_truthy(name)),
        Value::Bool(false) => Ok(!ctx.env_is_truthy(name)),
        Value::Null => Ok(actual.is_none_or(|v| v.is_empty())),
        Value::Array(allowed) if allowed.is_empty() => Ok(actual.as_deref() == Some("")),
        Value::Array(allowed) => {
            let allowed = allowed
                .iter()
                .map(|v| scalar_string(v, name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(actual.is_some_and(|a| allowed.contains(&a)))
        }
        scalar => {
            let wanted = scalar_string(scalar, name)?;
            Ok(actual.is_some_and(|a| a == wanted))
        }
    }
}

fn scalar_string(value: &Value, name: &str) -> Result<String, SymlinksError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok(String::new()),
        _ => Err(SymlinksError::invalid(format!(
            "The env condition for {name} must be a boolean, null, scalar or a list of scalars."
        ))),
    }
}

fn php_version_matches(value: &Value, ctx: &ConditionContext<'_>) -> Result<bool, SymlinksError> {
    let constraints = string_list(value, "php-version")?
        .into_iter()
        .map(str::parse::<Constraint>)
        .collect::<Result<Vec<_>, _>>()?;

    let Some(version) = ctx.php_version() else {
        return Ok(false);
    };
    Ok(constraints.iter().any(|c| c.matches(&version)))
}
