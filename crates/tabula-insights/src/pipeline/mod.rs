//! The staged processing pipeline.
//!
//! The pipeline is a fixed, ordered table of stages ([`STAGES`]) run by
//! a [`PipelineRunner`] over a shared [`StageContext`]. [`Pipeline`]
//! wraps the runner with configuration, the optional language model,
//! and the report store, turning one CSV file into an [`Analysis`].
//!
//! [`StageContext`]: crate::context::StageContext

mod builder;
mod runner;
mod stage;

pub use builder::{Analysis, Pipeline, PipelineBuilder};
pub use runner::{PipelineOutcome, PipelineRunner};
pub use stage::{STAGES, StageEnv, StageFn, StageResult, StageSpec, StageStatus};
