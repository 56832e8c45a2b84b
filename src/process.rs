use std::{
    io::Write,
    process::{Command, Stdio},
};

use crate::error::AppError;

/// Captured result of an external command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Converts a failed run into an error built from its stderr
    pub fn check<F>(self, err: F) -> Result<CommandOutput, AppError>
    where
        F: FnOnce(String) -> AppError,
    {
        if self.success {
            Ok(self)
        } else {
            Err(err(self.stderr.trim().to_string()))
        }
    }
}

/// Runs external programs (git, ssh-keygen, clipboard utilities)
pub trait CommandRunner {
    /// Runs `program` with `args`, feeding `stdin` when given, and waits for it to exit
    ///
    /// Commands fed on stdin are clipboard tools, which may leave a daemon behind
    /// holding their output streams, so their stdout and stderr are not captured.
    fn run(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<CommandOutput, AppError>;
}

/// Runs commands as real child processes
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Result<CommandOutput, AppError> {
        log::trace!("running {} {}", program, args.join(" "));

        let mut command = Command::new(program);
        command.args(args);

        let Some(input) = stdin else {
            let output = command.stdin(Stdio::null()).output()?;
            return Ok(CommandOutput {
                success: output.status.success(),
                code: output.status.code(),
                stdout: String::from_utf8(output.stdout)?,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        };

        // xclip and wl-copy fork a server that inherits these streams; waiting
        // for EOF on a pipe would block until that server exits
        command.stdin(Stdio::piped()).stdout(Stdio::null()).stderr(Stdio::null());
        let mut child = command.spawn()?;
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input)?;
        }
        let status = child.wait()?;

        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::new(),
            stderr: if status.success() {
                String::new()
            } else {
                format!("{program} exited with {status}")
            },
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_maps_failure_to_stderr() {
        let output = CommandOutput { success: false, code: Some(1), stdout: String::new(), stderr: " boom \n".to_string() };
        let result = output.check(AppError::GitCommand);
        assert!(matches!(result, Err(AppError::GitCommand(msg)) if msg == "boom"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output() {
        let output = SystemRunner.run("sh", &["-c", "echo hello; echo oops >&2; exit 3"], None).unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_command_does_not_wait_for_forked_children() {
        use std::time::{Duration, Instant};

        let temp_dir = tempfile::TempDir::new().unwrap();
        let script = temp_dir.path().join("clip-server.sh");
        std::fs::write(&script, "cat >/dev/null\n( sleep 5 ) &\nexit 0\n").unwrap();
        let script = script.to_string_lossy().into_owned();

        let started = Instant::now();
        let output = SystemRunner.run("sh", &[script.as_str()], Some(&b"ssh-ed25519 AAAA"[..])).unwrap();

        assert!(output.success);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_command_failure_is_reported() {
        let output = SystemRunner.run("sh", &["-c", "cat >/dev/null; exit 2"], Some(&b"key"[..])).unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(2));
        assert!(output.stderr.starts_with("sh exited with"));
    }
}
