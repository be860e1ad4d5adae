use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::ScanError;

/// Run an external scan tool and collect its stdout, bounded by a timeout.
///
/// The child is killed when the timeout elapses; an unbounded scan command
/// would stall the whole scan cycle.
pub async fn run_command(
    tool: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ScanError> {
    let output = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, output).await {
        Err(_) => {
            return Err(ScanError::Timeout {
                tool: tool.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        Ok(Err(e)) => {
            return Err(match e.kind() {
                io::ErrorKind::NotFound => ScanError::ToolMissing(tool.to_string()),
                io::ErrorKind::PermissionDenied => {
                    ScanError::PermissionDenied(tool.to_string())
                }
                _ => ScanError::Spawn(e),
            });
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ScanError::CommandFailed {
            tool: tool.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    Ok(String::from_utf8(output.stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_tool() {
        let err = run_command("hometrack-no-such-tool", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::ToolMissing(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_carries_status() {
        let err = run_command("sh", &["-c", "exit 3"], Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            ScanError::CommandFailed { status, .. } => assert_eq!(status, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_tool_times_out() {
        let err = run_command("sleep", &["5"], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Timeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_collected() {
        let out = run_command("sh", &["-c", "echo hello"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.trim(), "hello");
    }
}
