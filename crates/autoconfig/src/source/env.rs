use std::{collections::HashMap, env};

/// Snapshot of environment variables.
///
/// Use [`Self::from_iter()`] to supply variables that do not come from the process environment
/// (e.g., in tests).
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Loads all environment variables of the current process.
    pub fn from_env() -> Self {
        Self::from_iter(env::vars())
    }

    /// Loads environment variables of the current process starting with `{prefix}_` (case-insensitive).
    /// If `prefix` is empty, all variables are loaded.
    pub fn prefixed(prefix: &str) -> Self {
        if prefix.is_empty() {
            return Self::from_env();
        }
        let prefix = format!("{}_", prefix.to_uppercase());
        let vars = env::vars().filter(|(name, _)| name.to_uppercase().starts_with(&prefix));
        Self::from_iter(vars)
    }

    /// Creates a custom environment.
    #[allow(clippy::should_implement_trait)] // mirrors `from_env()`
    pub fn from_iter<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()));
        Self {
            vars: vars.collect(),
        }
    }

    /// Adds a variable to this environment, replacing the existing value if any.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Gets the value of a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns the number of variables in this environment.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Checks whether this environment is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Returns the env variable name for a key under the specified prefix, e.g. `APP_PORT` for key `port`
/// and prefix `app`.
pub fn env_var_name(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_uppercase()
    } else {
        format!("{prefix}_{key}").to_uppercase()
    }
}
