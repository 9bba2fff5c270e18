//! Fixed tool-to-model bindings.

use clap::ValueEnum;

/// The four query operations and the upstream model each one uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum QueryModel {
    /// Quick web search.
    Search,
    /// Conversational answer with real-time search.
    Ask,
    /// Multi-source deep research.
    Research,
    /// Step-by-step reasoning.
    Reason,
}

impl QueryModel {
    /// All operations, in tool publication order.
    pub const ALL: [Self; 4] = [Self::Search, Self::Ask, Self::Research, Self::Reason];

    /// Upstream model identifier.
    #[must_use]
    pub const fn model_id(self) -> &'static str {
        match self {
            Self::Search => "perplexity/sonar",
            Self::Ask => "perplexity/sonar-pro",
            Self::Research => "perplexity/sonar-deep-research",
            Self::Reason => "perplexity/sonar-reasoning-pro",
        }
    }

    /// Operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Ask => "ask",
            Self::Research => "research",
            Self::Reason => "reason",
        }
    }
}

impl std::fmt::Display for QueryModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
