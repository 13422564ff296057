use crate::check::CheckResult;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("check `{0}` is listed in the summary but produced no result")]
    UnknownCheck(String),
}

/// Results of one validation run, in execution order, split into the
/// checks that gate readiness and the ones that are merely reported.
#[derive(Debug, Clone)]
pub struct Report {
    results: Vec<CheckResult>,
    required: Vec<String>,
    optional: Vec<String>,
}

impl Report {
    pub fn new(
        results: Vec<CheckResult>,
        required: Vec<String>,
        optional: Vec<String>,
    ) -> Result<Self, ReportError> {
        for name in required.iter().chain(&optional) {
            if !results.iter().any(|result| &result.name == name) {
                return Err(ReportError::UnknownCheck(name.clone()));
            }
        }

        Ok(Self {
            results,
            required,
            optional,
        })
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|result| result.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &CheckResult> {
        self.required.iter().filter_map(|name| self.get(name))
    }

    pub fn optional(&self) -> impl Iterator<Item = &CheckResult> {
        self.optional.iter().filter_map(|name| self.get(name))
    }

    /// True when every required check passed. Optional checks never count.
    pub fn passed(&self) -> bool {
        self.required().all(CheckResult::passed)
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}
