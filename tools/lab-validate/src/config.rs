use crate::runner;

/// Overrides the interpreter the probes run under.
pub const PYTHON_ENV: &str = "LAB_VALIDATE_PYTHON";

/// Interpreters tried, in order, when no override is set.
pub const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateConfig {
    pub python: String,
}

impl ValidateConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), runner::command_exists)
    }

    pub fn from_lookup<L, E>(lookup: L, exists: E) -> Self
    where
        L: Fn(&str) -> Option<String>,
        E: Fn(&str) -> bool,
    {
        let python = lookup(PYTHON_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| {
                PYTHON_CANDIDATES
                    .iter()
                    .find(|candidate| exists(candidate))
                    .map(|candidate| candidate.to_string())
            })
            .unwrap_or_else(|| PYTHON_CANDIDATES[0].to_string());

        Self { python }
    }
}
