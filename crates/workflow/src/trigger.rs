//! Starting pipeline executions and reporting the outcome.

use std::sync::Arc;

use release::{
    OrchestratorError, PipelineName, PipelineOrchestrator, ReleaseTriggerError, TriggerOutcome,
};
use tracing::{error, info, instrument};

/// Starts pipeline executions.
///
/// A rejection from the orchestration service is logged and returned as
/// [`TriggerOutcome::Failed`]; only failures where the service never answered
/// become errors.
pub struct PipelineTrigger {
    orchestrator: Arc<dyn PipelineOrchestrator>,
}

impl PipelineTrigger {
    /// Creates a trigger that starts executions through `orchestrator`.
    pub fn new(orchestrator: Arc<dyn PipelineOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Requests a new execution of `name`.
    ///
    /// Logs exactly one record either way: `info` with the execution id on
    /// success, `error` when the service rejects the request.
    #[instrument(skip_all)]
    pub async fn start_pipeline(
        &self,
        name: &PipelineName,
    ) -> Result<TriggerOutcome, ReleaseTriggerError> {
        match self.orchestrator.start_execution(name).await {
            Ok(execution_id) => {
                info!(
                    pipeline = %name,
                    execution_id = %execution_id,
                    "started pipeline {name} - execution id {execution_id}"
                );
                Ok(TriggerOutcome::Started {
                    pipeline: name.clone(),
                    execution_id,
                })
            }
            // No alarm is raised here; this record and the Failed outcome are
            // the only failure signal.
            Err(OrchestratorError::Rejected { code, message, .. }) => {
                error!(
                    pipeline = %name,
                    code = code.as_deref().unwrap_or("unknown"),
                    error = %message,
                    "failed to start pipeline {name}"
                );
                Ok(TriggerOutcome::Failed {
                    pipeline: name.clone(),
                    reason: message,
                })
            }
            Err(other) => Err(other.into()),
        }
    }
}
