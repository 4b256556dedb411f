//! [`ToolRunner`] implementation backed by `tokio::process`.

use std::process::Stdio;

use async_trait::async_trait;
use release::{ToolError, ToolInvocation, ToolOutput, ToolRunner};
use tokio::process::Command;
use tracing::debug;

/// Runs tools as real child processes.
///
/// Children are killed if the awaiting future is dropped. Standard input is
/// always closed so an interactive prompt fails instead of blocking.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a new [`ProcessRunner`].
    pub fn new() -> Self {
        Self
    }
}

fn command(invocation: &ToolInvocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args);
    if let Some(dir) = &invocation.cwd {
        cmd.current_dir(dir);
    }
    if invocation.clear_env {
        cmd.env_clear();
    }
    cmd.envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    cmd.kill_on_drop(true);
    cmd
}

fn launch_error(invocation: &ToolInvocation) -> impl FnOnce(std::io::Error) -> ToolError + '_ {
    move |source| ToolError::Launch {
        program: invocation.program_name(),
        source,
    }
}

fn captured(output: std::process::Output) -> ToolOutput {
    ToolOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: ToolInvocation) -> Result<ToolOutput, ToolError> {
        // Environment values are never logged; they may carry credentials.
        debug!(program = %invocation.program_name(), args = ?invocation.args, "running tool");

        let output = command(&invocation)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(launch_error(&invocation))?;

        let output = captured(output);
        debug!(
            program = %invocation.program_name(),
            exit_code = ?output.exit_code,
            "tool finished"
        );
        Ok(output)
    }

    async fn run_piped(
        &self,
        producer: ToolInvocation,
        consumer: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        debug!(
            producer = %producer.program_name(),
            consumer = %consumer.program_name(),
            "running piped tools"
        );

        let mut producer_child = command(&producer)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch_error(&producer))?;

        let pipe: Stdio = producer_child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("producer stdout was not captured"))
            .and_then(|stdout| stdout.try_into())
            .map_err(launch_error(&producer))?;

        let consumer_child = command(&consumer)
            .stdin(pipe)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch_error(&consumer))?;

        // Both children are drained together; the producer may fill its
        // stderr pipe before the consumer sees end of input.
        let (producer_output, consumer_output) = tokio::join!(
            producer_child.wait_with_output(),
            consumer_child.wait_with_output()
        );
        let producer_output = producer_output.map_err(launch_error(&producer))?;
        let consumer_output = consumer_output.map_err(launch_error(&consumer))?;

        if !producer_output.status.success() {
            return Ok(ToolOutput {
                exit_code: producer_output.status.code(),
                stdout: String::new(),
                stderr: String::from_utf8_lossy(&producer_output.stderr).into_owned(),
            });
        }

        Ok(captured(consumer_output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let output = ProcessRunner::new()
            .run(ToolInvocation::new("sh").args(["-c", "echo hello; exit 3"]))
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, "hello\n");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn cleared_environment_only_sees_given_vars() {
        std::env::set_var("RELEASE_TRIGGER_LEAK_CHECK", "leaked");
        let output = ProcessRunner::new()
            .run(
                ToolInvocation::new("/bin/sh")
                    .args(["-c", "echo \"$RELEASE_TRIGGER_LEAK_CHECK|$ONLY_VAR\""])
                    .isolated_env([("ONLY_VAR".to_string(), "kept".to_string())]),
            )
            .await
            .unwrap();
        assert_eq!(output.stdout, "|kept\n");
    }

    #[tokio::test]
    async fn piped_output_reaches_consumer() {
        let output = ProcessRunner::new()
            .run_piped(
                ToolInvocation::new("sh").args(["-c", "printf 'a\\nb\\nc\\n'"]),
                ToolInvocation::new("wc").arg("-l"),
            )
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "3");
    }

    #[tokio::test]
    async fn failing_producer_is_reported() {
        let output = ProcessRunner::new()
            .run_piped(
                ToolInvocation::new("sh").args(["-c", "echo broken >&2; exit 1"]),
                ToolInvocation::new("cat"),
            )
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(1));
        assert_eq!(output.stderr, "broken\n");
    }

    #[tokio::test]
    async fn noisy_producer_stderr_does_not_block_the_pipe() {
        let output = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            ProcessRunner::new().run_piped(
                ToolInvocation::new("sh").args(["-c", "head -c 262144 /dev/zero >&2; echo done"]),
                ToolInvocation::new("cat"),
            ),
        )
        .await
        .expect("piped tools did not finish")
        .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "done\n");
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let err = ProcessRunner::new()
            .run(ToolInvocation::new("/nonexistent/release-trigger-tool"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/release-trigger-tool"));
    }
}
