/// Final state of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
    /// A precondition was unmet and the check was skipped.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub title: String,
    pub status: Status,
    pub messages: Vec<Message>,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.status == Status::Passed
    }
}

/// Collects the messages a probe emits, in order, until the probe settles
/// on a status. `finish` consumes the collector so results stay immutable.
#[derive(Debug)]
pub struct Findings {
    name: &'static str,
    title: &'static str,
    messages: Vec<Message>,
}

impl Findings {
    pub fn new(name: &'static str, title: &'static str) -> Self {
        Self {
            name,
            title,
            messages: Vec::new(),
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Severity::Success, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Severity::Warning, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Severity::Error, text);
    }

    fn push(&mut self, severity: Severity, text: impl Into<String>) {
        self.messages.push(Message {
            severity,
            text: text.into(),
        });
    }

    pub fn finish(self, status: Status) -> CheckResult {
        CheckResult {
            name: self.name.to_string(),
            title: self.title.to_string(),
            status,
            messages: self.messages,
        }
    }
}
