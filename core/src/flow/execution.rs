// paydesk/src/flow/execution.rs

//! `Pipeline::run()`: walks the steps in order and drives their handlers.

use crate::error::FlowError;
use crate::flow::context_data::ContextData;
use crate::flow::control::{PipelineControl, PipelineResult};
use crate::flow::definition::{Handler, Pipeline};
use crate::flow::step::StepDef;
use tracing::{event, instrument, span, Instrument, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
  Continue,
  Stopped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// Returns `Stopped` as soon as any handler asks to stop, the first handler
  /// error as-is, and `FlowError::HandlerMissing` (converted into `Err`) when a
  /// required step has nothing registered.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );
      let outcome = self.run_step(step_def, &ctx_data).instrument(step_span).await?;
      if outcome == StepOutcome::Stopped {
        return Ok(PipelineResult::Stopped);
      }
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: &ContextData<TData>) -> Result<StepOutcome, Err> {
    let step_name = step_def.name.as_str();

    if let Some(skip_if) = &step_def.skip_if {
      if skip_if(ctx_data.clone()) {
        event!(Level::INFO, "Step skipped by its skip condition.");
        return Ok(StepOutcome::Continue);
      }
    }

    let before = non_empty(self.before.get(step_name));
    let on = non_empty(self.on.get(step_name));
    let after = non_empty(self.after.get(step_name));

    if before.is_none() && on.is_none() && after.is_none() {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepOutcome::Continue);
      }
      event!(Level::ERROR, "Required step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in [("before", before), ("on", on), ("after", after)] {
      let Some(handlers) = handlers else { continue };
      if run_phase(phase, handlers, ctx_data).await? == StepOutcome::Stopped {
        event!(Level::INFO, phase, "Pipeline stopped by a handler.");
        return Ok(StepOutcome::Stopped);
      }
    }
    event!(Level::DEBUG, "Step finished.");
    Ok(StepOutcome::Continue)
  }
}

fn non_empty<T>(handlers: Option<&Vec<T>>) -> Option<&[T]> {
  handlers.map(Vec::as_slice).filter(|h| !h.is_empty())
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<StepOutcome, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  event!(Level::TRACE, phase, "Executing handlers.");
  for (handler_idx, handler) in handlers.iter().enumerate() {
    let handler_span = span!(Level::DEBUG, "handler", phase, handler_index = handler_idx);
    match handler(ctx_data.clone()).instrument(handler_span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => return Ok(StepOutcome::Stopped),
      Err(e) => {
        event!(Level::ERROR, error = %e, phase, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepOutcome::Continue)
}
