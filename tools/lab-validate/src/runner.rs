use std::io;
use std::process::{Command, Stdio};

/// Exit status and combined output of a finished helper command, such as
/// `python3 --version` when the banner looks up the interpreter version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: i32,
    pub stdout: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// True when `which` can resolve `name`. Used to pick a default interpreter.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a program to completion and return its exit status with stdout and
/// stderr merged. Older interpreters print `--version` on stderr.
pub fn run_output(program: &str, args: &[&str]) -> io::Result<CommandResult> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()?;

    Ok(CommandResult {
        status: output.status.code().unwrap_or(1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string()
            + &String::from_utf8_lossy(&output.stderr),
    })
}
