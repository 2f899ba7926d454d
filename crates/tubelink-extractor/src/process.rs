use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tubelink_core::FailureCause;

/// Runs `program` to completion, killing it if `limit` elapses first.
pub(crate) async fn run_with_timeout(
    program: &str,
    args: &[String],
    limit: Duration,
) -> Result<Output, FailureCause> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| FailureCause::Launch(format!("{}: {}", program, e)))?;

    match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(FailureCause::Launch(format!(
            "failed to wait for {}: {}",
            program, e
        ))),
        // Dropping the future drops the child, which kills it.
        Err(_) => Err(FailureCause::Timeout(limit)),
    }
}

/// Reduces captured stderr to the line worth reporting.
///
/// yt-dlp prints its `ERROR:` line last, after any warnings.
pub(crate) fn stderr_summary(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("no error output")
        .to_string()
}
