//! Python interpreter sessions.
//!
//! Every probe talks to the packages under test through a short-lived
//! interpreter. The child runs [`BOOTSTRAP`], which reads one JSON request
//! per line on stdin and writes one JSON reply per line on a duplicate of
//! the original stdout. Anything the imported libraries print, including
//! native writes to fd 1, goes to the child's stderr.

use crate::runner;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;

const BOOTSTRAP: &str = r#"
import json, os, sys
_reply = os.fdopen(os.dup(1), "w")
os.dup2(2, 1)
sys.stdout = sys.stderr
_ns = {"__name__": "__probe__"}
while True:
    _line = sys.stdin.readline()
    if not _line:
        break
    _line = _line.strip()
    if not _line:
        continue
    try:
        _code = json.loads(_line)["code"]
        try:
            _compiled = compile(_code, "<probe>", "eval")
        except SyntaxError:
            _compiled = None
        if _compiled is not None:
            _value = eval(_compiled, _ns)
        else:
            exec(compile(_code, "<probe>", "exec"), _ns)
            _value = None
        _text = json.dumps({"ok": True, "value": _value}, default=str, allow_nan=False)
    except BaseException as _e:
        _text = json.dumps({
            "ok": False,
            "kind": type(_e).__name__,
            "import_error": isinstance(_e, ImportError),
            "message": str(_e),
        })
    _reply.write(_text + "\n")
    _reply.flush()
"#;

#[derive(Debug, Error)]
pub enum EvalError {
    /// The evaluated code raised. Displays like Python's `str(e)`.
    #[error("{message}")]
    Raised {
        kind: String,
        message: String,
        import_error: bool,
    },
    #[error("failed to start interpreter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("interpreter I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("interpreter exited before replying")]
    Disconnected,
    #[error("unreadable interpreter reply: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl EvalError {
    pub fn raised(kind: &str, message: impl Into<String>) -> Self {
        Self::Raised {
            kind: kind.to_string(),
            import_error: kind == "ImportError" || kind == "ModuleNotFoundError",
            message: message.into(),
        }
    }

    /// True when the code raised `ImportError` or one of its subclasses.
    pub fn is_import_error(&self) -> bool {
        matches!(self, Self::Raised { import_error: true, .. })
    }
}

/// Evaluates Python source. Expressions yield their value as JSON,
/// statements yield `null`. Names bound by earlier calls stay visible.
pub trait Interpreter {
    fn eval(&mut self, code: &str) -> Result<Value, EvalError>;

    fn eval_str(&mut self, code: &str) -> Result<String, EvalError> {
        Ok(match self.eval(code)? {
            Value::String(text) => text,
            other => other.to_string(),
        })
    }

    fn eval_bool(&mut self, code: &str) -> Result<bool, EvalError> {
        let value = self.eval(code)?;
        Ok(match value {
            Value::Bool(flag) => flag,
            Value::Null => false,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => true,
        })
    }

    fn eval_u64(&mut self, code: &str) -> Result<u64, EvalError> {
        let value = self.eval(code)?;
        value
            .as_u64()
            .ok_or_else(|| unexpected("a non-negative integer", &value))
    }

    fn eval_f64(&mut self, code: &str) -> Result<f64, EvalError> {
        let value = self.eval(code)?;
        value.as_f64().ok_or_else(|| unexpected("a number", &value))
    }

    fn eval_strings(&mut self, code: &str) -> Result<Vec<String>, EvalError> {
        let value = self.eval(code)?;
        let Value::Array(items) = value else {
            return Err(unexpected("a list", &value));
        };
        Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect())
    }
}

fn unexpected(wanted: &str, got: &Value) -> EvalError {
    EvalError::raised("TypeError", format!("expected {wanted}, got {got}"))
}

impl<F> Interpreter for F
where
    F: FnMut(&str) -> Result<Value, EvalError>,
{
    fn eval(&mut self, code: &str) -> Result<Value, EvalError> {
        self(code)
    }
}

#[derive(Serialize)]
struct Request<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    import_error: bool,
    #[serde(default)]
    message: String,
}

impl Reply {
    fn into_result(self) -> Result<Value, EvalError> {
        if self.ok {
            Ok(self.value)
        } else {
            Err(EvalError::Raised {
                kind: self.kind,
                message: self.message,
                import_error: self.import_error,
            })
        }
    }
}

/// A live child interpreter. Killed and reaped on drop.
pub struct PythonSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl PythonSession {
    pub fn spawn(program: &str) -> Result<Self, EvalError> {
        let stderr = if log::log_enabled!(log::Level::Debug) {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        let mut child = Command::new(program)
            .args(["-u", "-c", BOOTSTRAP])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(|source| EvalError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EvalError::Disconnected);
        };

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl Interpreter for PythonSession {
    fn eval(&mut self, code: &str) -> Result<Value, EvalError> {
        log::debug!("python> {}", code.replace('\n', "; "));

        let request = serde_json::to_string(&Request { code })?;
        if let Err(error) = writeln!(self.stdin, "{request}").and_then(|()| self.stdin.flush()) {
            return Err(match error.kind() {
                io::ErrorKind::BrokenPipe => EvalError::Disconnected,
                _ => EvalError::Io(error),
            });
        }

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EvalError::Disconnected);
        }

        let reply: Reply = serde_json::from_str(line.trim_end())?;
        reply.into_result()
    }
}

impl Drop for PythonSession {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// The interpreter program the probes will run, with its version when it
/// could be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterInfo {
    pub program: String,
    pub version: Option<String>,
}

impl InterpreterInfo {
    pub fn probe(program: &str) -> Self {
        let version = runner::run_output(program, &["--version"])
            .ok()
            .filter(|output| output.success())
            .and_then(|output| parse_version(&output.stdout));

        Self {
            program: program.to_string(),
            version,
        }
    }
}

pub fn parse_version(output: &str) -> Option<String> {
    let re = Regex::new(r"\d+\.\d+\.\d+").ok()?;
    re.find(output).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_version_reads_first_semver_token() {
        assert_eq!(parse_version("Python 3.11.4"), Some("3.11.4".to_string()));
    }

    #[test]
    fn parse_version_returns_none_when_missing() {
        assert_eq!(parse_version("Python"), None);
    }

    #[test]
    fn failed_reply_becomes_raised_error() {
        let reply: Reply = serde_json::from_str(
            r#"{"ok": false, "kind": "ModuleNotFoundError", "import_error": true, "message": "No module named 'torch'"}"#,
        )
        .unwrap();
        let err = reply.into_result().unwrap_err();
        assert!(err.is_import_error());
        assert_eq!(err.to_string(), "No module named 'torch'");
    }

    #[test]
    fn ok_reply_without_value_is_null() {
        let reply: Reply = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert_eq!(reply.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn raised_classifies_import_errors_by_kind() {
        assert!(EvalError::raised("ModuleNotFoundError", "x").is_import_error());
        assert!(EvalError::raised("ImportError", "x").is_import_error());
        assert!(!EvalError::raised("RuntimeError", "x").is_import_error());
        assert!(!EvalError::Disconnected.is_import_error());
    }

    #[test]
    fn typed_helpers_convert_values() {
        let mut py = |code: &str| -> Result<Value, EvalError> {
            Ok(match code {
                "count" => json!(2),
                "flag" => json!(true),
                "mem" => json!(8.5e10),
                "names" => json!(["E4M3", "HYBRID"]),
                "shape" => json!([8, 256]),
                _ => Value::Null,
            })
        };

        assert_eq!(py.eval_u64("count").unwrap(), 2);
        assert!(py.eval_bool("flag").unwrap());
        assert!(!py.eval_bool("other").unwrap());
        assert_eq!(py.eval_f64("mem").unwrap(), 8.5e10);
        assert_eq!(py.eval_strings("names").unwrap(), vec!["E4M3", "HYBRID"]);
        assert_eq!(py.eval_str("shape").unwrap(), "[8,256]");
        assert!(py.eval_u64("flag").is_err());
        assert!(py.eval_strings("count").is_err());
    }

    #[test]
    fn spawn_reports_missing_program() {
        match PythonSession::spawn("this-python-does-not-exist-xyz") {
            Err(EvalError::Spawn { program, .. }) => {
                assert_eq!(program, "this-python-does-not-exist-xyz")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("spawn should fail"),
        }
    }

    #[cfg(unix)]
    fn fake_interpreter(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("python");
        std::fs::write(&path, format!("#!/usr/bin/env sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn session_reads_one_reply_per_request() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_interpreter(
            dir.path(),
            r#"while IFS= read -r line; do echo '{"ok": true, "value": "2.3.0"}'; done"#,
        );

        let mut session = PythonSession::spawn(&program).unwrap();
        assert_eq!(session.eval_str("torch.__version__").unwrap(), "2.3.0");
        assert_eq!(session.eval_str("torch.__version__").unwrap(), "2.3.0");
    }

    #[cfg(unix)]
    #[test]
    fn session_reports_disconnect_when_child_exits() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_interpreter(dir.path(), "exit 0");

        let mut session = PythonSession::spawn(&program).unwrap();
        let err = session.eval("import torch").unwrap_err();
        assert!(matches!(
            err,
            EvalError::Disconnected | EvalError::Io(_)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn session_rejects_garbage_replies() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_interpreter(
            dir.path(),
            "while IFS= read -r line; do echo 'not json'; done",
        );

        let mut session = PythonSession::spawn(&program).unwrap();
        assert!(matches!(
            session.eval("1"),
            Err(EvalError::Protocol(_))
        ));
    }

    #[test]
    fn non_finite_floats_come_back_as_python_errors() {
        if !runner::command_exists("python3") {
            return;
        }

        let mut session = PythonSession::spawn("python3").unwrap();
        match session.eval("float('nan')") {
            Err(EvalError::Raised { kind, import_error, .. }) => {
                assert_eq!(kind, "ValueError");
                assert!(!import_error);
            }
            other => panic!("expected a raised ValueError, got {other:?}"),
        }
        assert_eq!(session.eval_u64("1 + 1").unwrap(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn interpreter_info_reads_version() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_interpreter(dir.path(), "echo 'Python 3.12.1'");

        let info = InterpreterInfo::probe(&program);
        assert_eq!(info.version.as_deref(), Some("3.12.1"));
    }
}
