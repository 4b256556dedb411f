//! Recording fakes for the port traits and a log capture helper.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use release::{
    ExecutionId, OrchestratorError, PipelineName, PipelineOrchestrator, SecretId, SecretStore,
    SecretStoreError, SecretValue, ToolError, ToolInvocation, ToolOutput, ToolRunner,
};
use tracing_subscriber::fmt::MakeWriter;

// ---------------------------------------------------------------------------
// Secret store
// ---------------------------------------------------------------------------

pub struct FakeSecretStore {
    token: Option<&'static str>,
    requests: Mutex<Vec<SecretId>>,
}

impl FakeSecretStore {
    pub fn with_token(token: &'static str) -> Self {
        Self {
            token: Some(token),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            token: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SecretId> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn get_secret(&self, secret_id: &SecretId) -> Result<SecretValue, SecretStoreError> {
        self.requests.lock().unwrap().push(secret_id.clone());
        self.token
            .map(SecretValue::new)
            .ok_or_else(|| SecretStoreError::NotFound {
                secret_id: secret_id.clone(),
            })
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub enum Reply {
    Started(&'static str),
    Rejected(&'static str),
    Unavailable,
}

pub struct FakeOrchestrator {
    reply: Reply,
    calls: Mutex<Vec<PipelineName>>,
}

impl FakeOrchestrator {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<PipelineName> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineOrchestrator for FakeOrchestrator {
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
    ) -> Result<ExecutionId, OrchestratorError> {
        self.calls.lock().unwrap().push(pipeline.clone());
        match self.reply {
            Reply::Started(id) => Ok(ExecutionId::new(id).unwrap()),
            Reply::Rejected(message) => Err(OrchestratorError::Rejected {
                pipeline: pipeline.clone(),
                code: Some("PipelineNotFoundException".into()),
                message: message.into(),
            }),
            Reply::Unavailable => Err(OrchestratorError::Unavailable {
                pipeline: pipeline.clone(),
                message: "dispatch failure".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

pub fn exit(code: i32, stdout: &str, stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(code),
        stdout: stdout.into(),
        stderr: stderr.into(),
    }
}

/// Answers `git clone` and `git log` with scripted outputs. A successful
/// clone creates its destination directory, which must not exist beforehand.
pub struct ScriptedGit {
    clone: ToolOutput,
    log: ToolOutput,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl ScriptedGit {
    pub fn new(clone: ToolOutput, log: ToolOutput) -> Self {
        Self {
            clone,
            log,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_subject(subject: &str) -> Self {
        Self::new(exit(0, "", ""), exit(0, &format!("{subject}\n"), ""))
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn subcommands(&self) -> Vec<String> {
        self.calls().iter().filter_map(subcommand).collect()
    }
}

fn subcommand(invocation: &ToolInvocation) -> Option<String> {
    invocation
        .args
        .iter()
        .find(|arg| *arg == "clone" || *arg == "log")
        .cloned()
}

#[async_trait]
impl ToolRunner for ScriptedGit {
    async fn run(&self, invocation: ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.calls.lock().unwrap().push(invocation.clone());
        match subcommand(&invocation).as_deref() {
            Some("clone") => {
                let dest = PathBuf::from(invocation.args.last().unwrap());
                assert!(!dest.exists(), "stale clone at {} was not removed", dest.display());
                if self.clone.success() {
                    std::fs::create_dir_all(&dest).unwrap();
                }
                Ok(self.clone.clone())
            }
            Some("log") => Ok(self.log.clone()),
            _ => panic!("unexpected git invocation {:?}", invocation.args),
        }
    }

    async fn run_piped(
        &self,
        _producer: ToolInvocation,
        _consumer: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        unreachable!("the prober never pipes")
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes INFO-and-above records on the current thread into a buffer until
/// the guard is dropped.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
