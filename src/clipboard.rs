use std::io::ErrorKind;

use crate::{error::AppError, process::CommandRunner};

type Tool = (&'static str, &'static [&'static str]);

const PBCOPY: Tool = ("pbcopy", &[]);
const CLIP: Tool = ("clip", &[]);
const WL_COPY: Tool = ("wl-copy", &[]);
const XCLIP: Tool = ("xclip", &["-selection", "clipboard"]);
const XSEL: Tool = ("xsel", &["--clipboard", "--input"]);

/// Clipboard utilities to try, in order, for the running platform
fn candidates() -> Vec<Tool> {
    if cfg!(target_os = "macos") {
        vec![PBCOPY]
    } else if cfg!(windows) {
        vec![CLIP]
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        vec![WL_COPY, XCLIP, XSEL]
    } else {
        vec![XCLIP, XSEL]
    }
}

/// Copies `text` to the system clipboard using the first utility that works
pub fn copy_to_clipboard(runner: &dyn CommandRunner, text: &str) -> Result<(), AppError> {
    let mut failures: Vec<String> = Vec::new();

    for (program, args) in candidates() {
        match runner.run(program, args, Some(text.as_bytes())) {
            Ok(output) if output.success => {
                log::debug!("copied {} bytes with {program}", text.len());
                return Ok(());
            }
            Ok(output) => failures.push(format!("{program}: {}", output.stderr.trim())),
            Err(AppError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                log::debug!("{program} not installed");
            }
            Err(err) => failures.push(format!("{program}: {err}")),
        }
    }

    if failures.is_empty() {
        Err(AppError::Clipboard("no clipboard utility found".to_string()))
    } else {
        Err(AppError::Clipboard(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::FakeRunner;

    #[test]
    fn test_copy_feeds_text_on_stdin() {
        let runner = FakeRunner::default();
        copy_to_clipboard(&runner, "ssh-ed25519 AAAA alice@co.com\n").unwrap();
        assert_eq!(
            runner.state.borrow().clipboard.as_deref(),
            Some("ssh-ed25519 AAAA alice@co.com\n")
        );
    }

    #[test]
    fn test_missing_utilities_are_reported() {
        let runner = FakeRunner::default();
        runner.state.borrow_mut().clipboard_missing = true;

        let result = copy_to_clipboard(&runner, "key");
        assert!(matches!(result, Err(AppError::Clipboard(msg)) if msg == "no clipboard utility found"));
    }
}
