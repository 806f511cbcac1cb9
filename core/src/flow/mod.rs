//! A small asynchronous step pipeline.
//!
//! A `Pipeline<TData, Err>` is an ordered list of named steps. Each step can
//! carry `before`, `on` and `after` handlers; handlers are async closures over
//! a shared `ContextData<TData>` and either continue, stop the run, or fail it
//! with the pipeline's error type. The checkout orchestrator runs every payment
//! attempt as one of these pipelines.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod hooks;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline};
pub use step::{SkipCondition, StepDef};
