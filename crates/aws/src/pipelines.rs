//! [`PipelineOrchestrator`] over AWS CodePipeline.

use async_trait::async_trait;
use aws_sdk_codepipeline::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_codepipeline::operation::start_pipeline_execution::StartPipelineExecutionError;
use aws_sdk_codepipeline::Client;
use release::{ExecutionId, OrchestratorError, PipelineName, PipelineOrchestrator};
use tracing::instrument;

/// Starts executions with `StartPipelineExecution`.
#[derive(Debug, Clone)]
pub struct CodePipelineOrchestrator {
    client: Client,
}

impl CodePipelineOrchestrator {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PipelineOrchestrator for CodePipelineOrchestrator {
    #[instrument(skip(self, pipeline), fields(pipeline = %pipeline))]
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
    ) -> Result<ExecutionId, OrchestratorError> {
        let output = self
            .client
            .start_pipeline_execution()
            .name(pipeline.as_str())
            .send()
            .await
            .map_err(|err| classify_start_error(pipeline, err))?;

        output
            .pipeline_execution_id()
            .and_then(ExecutionId::new)
            .ok_or_else(|| OrchestratorError::MissingExecutionId {
                pipeline: pipeline.clone(),
            })
    }
}

/// Splits SDK failures into service rejections, which the trigger reports
/// as a failed outcome, and everything else, which propagates.
pub(crate) fn classify_start_error<R>(
    pipeline: &PipelineName,
    err: SdkError<StartPipelineExecutionError, R>,
) -> OrchestratorError
where
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.as_service_error() {
        Some(service) => OrchestratorError::Rejected {
            pipeline: pipeline.clone(),
            code: service.code().map(str::to_string),
            message,
        },
        None => OrchestratorError::Unavailable {
            pipeline: pipeline.clone(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_codepipeline::types::error::PipelineNotFoundException;

    use super::*;

    fn pipeline() -> PipelineName {
        PipelineName::new("release-pipeline").unwrap()
    }

    #[test]
    fn service_error_is_a_rejection() {
        let err = SdkError::service_error(
            StartPipelineExecutionError::PipelineNotFoundException(
                PipelineNotFoundException::builder()
                    .message("The account with id '123' does not include a pipeline with the name 'release-pipeline'")
                    .build(),
            ),
            (),
        );
        match classify_start_error(&pipeline(), err) {
            OrchestratorError::Rejected { pipeline, message, .. } => {
                assert_eq!(pipeline.as_str(), "release-pipeline");
                assert!(message.contains("does not include a pipeline"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn timeout_is_unavailable() {
        let err: SdkError<StartPipelineExecutionError, ()> =
            SdkError::timeout_error("operation timed out");
        assert!(matches!(
            classify_start_error(&pipeline(), err),
            OrchestratorError::Unavailable { .. }
        ));
    }
}
