//! Summarizer stage: turns the computed statistics into prose.
//!
//! The language model is optional at every level. No provider, a provider
//! error, or an empty reply all land on a templated fallback summary, so
//! this stage only fails when its statistics input is missing entirely.

use tracing::{debug, warn};

use crate::context::{ContextValue, StageContext, keys};
use crate::error::{PipelineError, Result};
use crate::pipeline::StageEnv;

const SUMMARY_PROMPT: &str = "You are a smart business analyst. Given the following statistical \
summary of a dataset, write a clear, natural-language summary of the key insights:";

const NO_NUMERIC_SUMMARY: &str = "No numeric columns were found in the dataset, so no statistical \
summary could be generated.";

pub(crate) fn run(ctx: &mut StageContext, env: &StageEnv<'_>) -> Result<String> {
    let stats = ctx
        .stats(keys::COLUMN_STATS)
        .ok_or_else(|| PipelineError::StageFailed {
            stage: "summarizer".to_string(),
            reason: "column_stats missing from context".to_string(),
        })?;

    // An empty stats map means the analyzer ran but found nothing numeric.
    // There is nothing to prompt a model with, so complete degraded.
    let summary = if stats.is_empty() {
        NO_NUMERIC_SUMMARY.to_string()
    } else {
        let stats_text = serde_json::to_string_pretty(stats)?;
        generate(env.llm, &stats_text)
    };

    let chars = summary.chars().count();
    ctx.set(keys::SUMMARY_TEXT, ContextValue::Text(summary));

    Ok(format!("Summary generated ({chars} chars)"))
}

fn generate(llm: Option<&dyn crate::llm::LlmProvider>, stats_text: &str) -> String {
    let Some(provider) = llm else {
        debug!("No language model configured, using templated summary");
        return fallback_summary(stats_text);
    };

    match provider.generate_summary(&build_prompt(stats_text)) {
        Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
        Ok(_) => {
            warn!(
                "{} returned an empty reply, using templated summary",
                provider.name()
            );
            fallback_summary(stats_text)
        }
        Err(e) => {
            warn!("{} call failed ({}), using templated summary", provider.name(), e);
            fallback_summary(stats_text)
        }
    }
}

fn build_prompt(stats_text: &str) -> String {
    format!("{SUMMARY_PROMPT}\n\n{stats_text}")
}

fn fallback_summary(stats_text: &str) -> String {
    format!("(LLM unavailable) Key data statistics:\n{stats_text}")
}
