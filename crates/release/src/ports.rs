//! Port traits implemented by infrastructure crates.
//!
//! The workflow crate depends only on these traits; `aws` and `toolchain`
//! supply the production implementations and tests supply recording fakes.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    ExecutionId, OrchestratorError, PipelineName, SecretId, SecretStoreError, SecretValue,
    ToolError,
};

// ---------------------------------------------------------------------------
// Cloud services
// ---------------------------------------------------------------------------

/// Read-only access to a managed secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches the string value of `secret_id`.
    ///
    /// No caching: every call reaches the store.
    async fn get_secret(&self, secret_id: &SecretId) -> Result<SecretValue, SecretStoreError>;
}

/// Starts executions of deployment pipelines.
#[async_trait]
pub trait PipelineOrchestrator: Send + Sync {
    /// Starts one execution of `pipeline` and returns its identifier.
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
    ) -> Result<ExecutionId, OrchestratorError>;
}

// ---------------------------------------------------------------------------
// External tools
// ---------------------------------------------------------------------------

/// A fully described external command.
///
/// `Debug` prints environment variable names only; values may carry
/// credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Program to execute (absolute path or name resolved via `PATH`).
    pub program: PathBuf,
    /// Arguments passed after the program.
    pub args: Vec<String>,
    /// Working directory; `None` inherits the caller's.
    pub cwd: Option<PathBuf>,
    /// Environment variables set for the child.
    pub env: Vec<(String, String)>,
    /// When `true` the inherited environment is cleared before `env` is applied.
    pub clear_env: bool,
}

impl ToolInvocation {
    /// Creates an invocation of `program` with no arguments that inherits
    /// the caller's environment and working directory.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            clear_env: false,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Adds one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Replaces the inherited environment with exactly `vars`.
    pub fn isolated_env<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.clear_env = true;
        self.env.extend(vars);
        self
    }

    /// Returns the program name for diagnostics.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl std::fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_keys: Vec<&str> = self.env.iter().map(|(key, _)| key.as_str()).collect();
        f.debug_struct("ToolInvocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("cwd", &self.cwd)
            .field("env", &env_keys)
            .field("clear_env", &self.clear_env)
            .finish()
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

impl ToolOutput {
    /// Returns `true` when the tool exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external tools to completion.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs `invocation` and captures its output.
    async fn run(&self, invocation: ToolInvocation) -> Result<ToolOutput, ToolError>;

    /// Runs `producer` with its standard output piped into `consumer`'s
    /// standard input, returning the consumer's output. A producer failure is
    /// reported through the returned output's exit code and stderr.
    async fn run_piped(
        &self,
        producer: ToolInvocation,
        consumer: ToolInvocation,
    ) -> Result<ToolOutput, ToolError>;
}
