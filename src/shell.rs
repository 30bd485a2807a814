use std::collections::HashMap;
use std::process::{Command, Stdio};
use log::{trace, warn};

/// Interpreter every command string is handed to.
pub const SHELL: &str = "/bin/sh";

/// What a finished child process left behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellOutput {
    /// Combined stdout + stderr. `None` when the bytes were not valid UTF-8.
    pub output: Option<String>,
    /// Exit status, or `-1` if the child never ran or was killed by a signal.
    pub exit_code: i32,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The captured text, degrading to `""` when it could not be decoded.
    pub fn text(&self) -> &str {
        self.output.as_deref().unwrap_or_default()
    }
}

/// Abstraction over spawning shell commands.
/// This lets the deploy sequence run against a mock in tests.
pub trait ShellOps {
    /// Run `command` through a POSIX shell and wait for it to exit.
    ///
    /// Never fails: a command that cannot be launched is reported as exit code `-1`
    /// with no output, and undecodable output is reported as `None`.
    fn run(&self, command: &str) -> ShellOutput;

    /// Run `command`, throw the exit code away, and return only its text.
    ///
    /// A failing command is indistinguishable from a quiet one here. That is
    /// the fire-and-forget contract the deploy steps rely on.
    fn simple_shell(&self, command: &str) -> String {
        self.run(command).text().to_string()
    }
}

/// The real shell (Production).
pub struct PosixShell;

impl ShellOps for PosixShell {
    fn run(&self, command: &str) -> ShellOutput {
        // `exec 2>&1` points the shell's own stderr at the stdout pipe before the
        // command runs, so both streams interleave into one buffer.
        let script = format!("exec 2>&1\n{}", command);

        // `output()` drains the pipe and reaps the child on every path.
        let result = Command::new(SHELL)
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .output();

        match result {
            Ok(out) => {
                let mut bytes = out.stdout;
                bytes.extend_from_slice(&out.stderr);
                let output = String::from_utf8(bytes).ok();
                if output.is_none() {
                    trace!("Output of `{}` was not valid UTF-8, dropping it", command);
                }
                ShellOutput {
                    output,
                    exit_code: out.status.code().unwrap_or(-1),
                }
            }
            Err(e) => {
                warn!("Failed to launch {}: {}", SHELL, e);
                ShellOutput { output: None, exit_code: -1 }
            }
        }
    }
}

/// A Mock Shell for Testing.
///
/// Records every command it is given. Commands are answered from `responses`
/// by exact match; anything else "succeeds" with empty output.
#[derive(Debug, Default)]
pub struct MockShell {
    pub commands: std::sync::Mutex<Vec<String>>,
    pub responses: std::sync::Mutex<HashMap<String, ShellOutput>>,
}

impl MockShell {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn respond(&self, command: &str, output: ShellOutput) {
        let mut map = self.responses.lock().unwrap();
        map.insert(command.to_string(), output);
    }

    #[allow(dead_code)]
    pub fn recorded(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl ShellOps for MockShell {
    fn run(&self, command: &str) -> ShellOutput {
        self.commands.lock().unwrap().push(command.to_string());
        let map = self.responses.lock().unwrap();
        map.get(command).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let out = PosixShell.run("printf hello; exit 3");
        assert_eq!(out.output.as_deref(), Some("hello"));
        assert_eq!(out.exit_code, 3);
        assert!(!out.success());
    }

    #[test]
    fn test_stderr_lands_in_the_same_buffer() {
        let out = PosixShell.run("printf one; printf two >&2; printf three");
        assert_eq!(out.text(), "onetwothree");
        assert!(out.success());
    }

    #[test]
    fn test_undecodable_output_becomes_empty_string() {
        let out = PosixShell.run("printf '\\377\\376'");
        assert_eq!(out.output, None);
        assert_eq!(out.exit_code, 0);
        assert_eq!(PosixShell.simple_shell("printf '\\377\\376'"), "");
    }

    #[test]
    fn test_missing_command_is_not_an_error() {
        let text = PosixShell.simple_shell("definitely-not-a-real-tool-xyz");
        assert!(text.contains("not found"), "unexpected output: {text:?}");
        let out = PosixShell.run("definitely-not-a-real-tool-xyz");
        assert_eq!(out.exit_code, 127);
    }

    #[test]
    fn test_mock_records_and_answers() {
        let mock = MockShell::new();
        mock.respond(
            "echo hi",
            ShellOutput { output: Some("hi\n".into()), exit_code: 0 },
        );
        assert_eq!(mock.simple_shell("echo hi"), "hi\n");
        assert_eq!(mock.simple_shell("anything"), "");
        assert_eq!(mock.recorded(), vec!["echo hi", "anything"]);
    }
}
