//! Agent metadata exposed by the status and health endpoints.

use serde::Serialize;

/// Metadata describing one pipeline agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentInfo {
    pub agent_name: &'static str,
    pub status: &'static str,
    pub description: &'static str,
}

static AGENTS: [AgentInfo; 4] = [
    AgentInfo {
        agent_name: "ingestor",
        status: "ready",
        description: "Loads a CSV file into a DataFrame",
    },
    AgentInfo {
        agent_name: "cleaner",
        status: "ready",
        description: "Detects missing values and provides cleaning suggestions.",
    },
    AgentInfo {
        agent_name: "analyzer",
        status: "ready",
        description: "Performs statistical summary of numerical data.",
    },
    AgentInfo {
        agent_name: "summarizer",
        status: "ready",
        description: "Summarizes dataset statistics in natural language.",
    },
];

/// The fixed set of agents behind the pipeline.
///
/// Stage execution is driven by the stage table; this registry only
/// carries the descriptive metadata served to API clients.
pub struct AgentRegistry;

impl AgentRegistry {
    pub fn agents() -> &'static [AgentInfo] {
        &AGENTS
    }

    pub fn names() -> Vec<&'static str> {
        AGENTS.iter().map(|a| a.agent_name).collect()
    }

    pub fn count() -> usize {
        AGENTS.len()
    }

    pub fn get(name: &str) -> Option<&'static AgentInfo> {
        AGENTS.iter().find(|a| a.agent_name == name)
    }
}
