//! Release trigger entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — flags and environment variables, validated
//!    before any external call is made.
//! 2. **Wire observability** — `tracing-subscriber` with a JSON or text layer
//!    and an optional OpenTelemetry OTLP exporter.
//! 3. **Provision git** — exactly once per process, before the first event.
//!    Failure aborts the process.
//! 4. **Construct infrastructure** — AWS clients and the process runner,
//!    injected into the `workflow` components.
//! 5. **Select trigger mode**:
//!    - `lambda` — serve the Lambda runtime loop.
//!    - `invoke` — handle one event from `--event` (exit code 2 when the
//!      orchestrator rejects the start).
//!    - `probe` — report whether a branch has unreleased changes.

mod config;
mod observability;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lambda_runtime::{service_fn, LambdaEvent};
use release::{SourceDescriptor, ToolRunner};
use serde_json::{json, Value};
use toolchain::{GitInstallation, ProcessRunner, Provisioner};
use tracing::{error, info};
use workflow::{CredentialFetcher, EventHandler, PipelineTrigger, RepositoryProber};

use crate::config::{Cli, Settings, Task};
use crate::observability::Telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = &cli.settings;
    let telemetry = match observability::init(
        settings.log_format,
        settings.otlp_endpoint.as_deref(),
    ) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("release-trigger: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli, &telemetry).await;
    let code = match result {
        Ok(code) => code,
        Err(err) => {
            error!("release trigger failed: {err:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(cli: Cli, telemetry: &Telemetry) -> Result<ExitCode> {
    let settings = cli.settings;
    let task = cli.mode.into_task()?;
    let secret_id = settings.secret_id()?;

    let runner: Arc<dyn ToolRunner> = Arc::new(ProcessRunner::new());
    let provisioner = Provisioner::new(
        settings.tool_package(),
        settings.installation(),
        runner.clone(),
    );
    let installation = provisioner
        .ensure_tool_installed()
        .await
        .context("git provisioning failed")?
        .clone();

    let sdk_config = aws::load_sdk_config(&settings.region).await;

    match task {
        Task::Lambda => {
            let handler = event_handler(&sdk_config);
            serve_lambda(handler, telemetry.clone()).await
        }
        Task::Invoke(event) => {
            let outcome = event_handler(&sdk_config).handle(&event).await?;
            println!("{}", serde_json::to_string(&outcome)?);
            Ok(if outcome.is_started() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
        Task::Probe(source) => {
            let credentials = CredentialFetcher::new(
                Arc::new(aws::SecretsManagerStore::new(&sdk_config)),
                secret_id,
            );
            probe(&settings, credentials, runner, installation, source).await
        }
    }
}

fn event_handler(sdk_config: &aws::SdkConfig) -> EventHandler {
    let orchestrator = Arc::new(aws::CodePipelineOrchestrator::new(sdk_config));
    EventHandler::new(PipelineTrigger::new(orchestrator))
}

async fn serve_lambda(handler: EventHandler, telemetry: Telemetry) -> Result<ExitCode> {
    info!("serving lambda events");
    let handler = Arc::new(handler);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        let telemetry = telemetry.clone();
        async move {
            let outcome = handler.handle(&event.payload).await;
            telemetry.flush();
            outcome.map_err(lambda_runtime::Error::from)
        }
    }))
    .await
    .map_err(|err| anyhow!(err))?;

    Ok(ExitCode::SUCCESS)
}

async fn probe(
    settings: &Settings,
    credentials: CredentialFetcher,
    runner: Arc<dyn ToolRunner>,
    installation: GitInstallation,
    source: SourceDescriptor,
) -> Result<ExitCode> {
    let prober = RepositoryProber::new(credentials, runner, installation, settings.clones_root());
    let changes = prober.changes_since_last_release(&source).await?;

    println!(
        "{}",
        json!({
            "owner": source.owner,
            "repo": source.repo,
            "branch": source.branch,
            "changes": changes,
        })
    );
    Ok(ExitCode::SUCCESS)
}
