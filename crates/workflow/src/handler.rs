//! Entry point for platform events.

use release::{InvocationId, PipelineName, ReleaseTriggerError, TriggerOutcome};
use serde_json::Value;
use tracing::{info, info_span, Instrument};

use crate::PipelineTrigger;

/// Event field naming the pipeline to start.
pub const PIPELINE_NAME_FIELD: &str = "pipelineName";

/// Platform event handler: `{"pipelineName": "..."}` in, [`TriggerOutcome`] out.
pub struct EventHandler {
    trigger: PipelineTrigger,
}

impl EventHandler {
    pub fn new(trigger: PipelineTrigger) -> Self {
        Self { trigger }
    }

    /// Logs the raw event, then starts the named pipeline exactly once.
    ///
    /// Fails without contacting the orchestrator when the pipeline name is
    /// missing or not a non-empty string.
    pub async fn handle(&self, event: &Value) -> Result<TriggerOutcome, ReleaseTriggerError> {
        let span = info_span!("handle", invocation_id = %InvocationId::new_random());
        async move {
            info!(event = %event, "received event");
            let name = pipeline_name(event)?;
            self.trigger.start_pipeline(&name).await
        }
        .instrument(span)
        .await
    }
}

fn pipeline_name(event: &Value) -> Result<PipelineName, ReleaseTriggerError> {
    let value = event
        .get(PIPELINE_NAME_FIELD)
        .ok_or(ReleaseTriggerError::MissingEventField {
            field: PIPELINE_NAME_FIELD,
        })?;
    value
        .as_str()
        .and_then(PipelineName::new)
        .ok_or(ReleaseTriggerError::InvalidEventField {
            field: PIPELINE_NAME_FIELD,
        })
}
