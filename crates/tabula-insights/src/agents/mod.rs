//! The four stage implementations behind the pipeline.
//!
//! Each agent is a plain function with the [`StageFn`] signature, wired
//! into the stage table in [`crate::pipeline`]. Agents communicate only
//! through the [`StageContext`]; none of them holds state of its own.
//!
//! [`StageFn`]: crate::pipeline::StageFn
//! [`StageContext`]: crate::context::StageContext

pub(crate) mod analyzer;
pub(crate) mod cleaner;
pub(crate) mod ingestor;
mod registry;
pub(crate) mod summarizer;

pub use registry::{AgentInfo, AgentRegistry};
