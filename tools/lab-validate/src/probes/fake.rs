use crate::python::{EvalError, Interpreter};
use serde_json::Value;

#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Raise { kind: &'static str, message: String },
}

/// Scripted interpreter. The first rule whose pattern occurs in the code
/// decides the reply; unmatched code evaluates to `None` unless
/// `otherwise_missing` was set.
#[derive(Debug, Default)]
pub struct FakePython {
    rules: Vec<(String, Reply)>,
    missing_by_default: bool,
    pub calls: Vec<String>,
}

impl FakePython {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returns(mut self, pattern: &str, value: Value) -> Self {
        self.rules.push((pattern.to_string(), Reply::Value(value)));
        self
    }

    pub fn raises(mut self, pattern: &str, kind: &'static str, message: &str) -> Self {
        self.rules.push((
            pattern.to_string(),
            Reply::Raise {
                kind,
                message: message.to_string(),
            },
        ));
        self
    }

    pub fn missing(self, pattern: &str, module: &str) -> Self {
        self.raises(
            pattern,
            "ModuleNotFoundError",
            &format!("No module named '{module}'"),
        )
    }

    pub fn otherwise_missing(mut self) -> Self {
        self.missing_by_default = true;
        self
    }

    pub fn called_with(&self, pattern: &str) -> bool {
        self.calls.iter().any(|code| code.contains(pattern))
    }
}

impl Interpreter for FakePython {
    fn eval(&mut self, code: &str) -> Result<Value, EvalError> {
        self.calls.push(code.to_string());
        let reply = self
            .rules
            .iter()
            .find(|(pattern, _)| code.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Value(value)) => Ok(value),
            Some(Reply::Raise { kind, message }) => Err(EvalError::raised(kind, message)),
            None if self.missing_by_default => {
                Err(EvalError::raised("ModuleNotFoundError", "No module named 'stub'"))
            }
            None => Ok(Value::Null),
        }
    }
}
