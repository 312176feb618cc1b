//! Model variant to generation options, resolved in one place

use serde::Serialize;

use crate::config::ModelTable;
use crate::types::ModelVariant;

/// Thinking-token budget granted to the deep reasoning variant
pub const DEEP_REASONING_BUDGET: u32 = 32_768;

/// Backend options for one generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOptions {
    /// Backend model identifier
    pub endpoint_model_id: String,
    /// Enable the web search tool
    pub search_enabled: bool,
    /// Extended reasoning budget in tokens
    pub reasoning_budget: Option<u32>,
}

impl ModelTable {
    /// Resolve the option profile for a variant
    pub fn resolve(&self, variant: ModelVariant) -> GenerationOptions {
        match variant {
            ModelVariant::DeepReasoning => GenerationOptions {
                endpoint_model_id: self.deep_reasoning.clone(),
                search_enabled: false,
                reasoning_budget: Some(DEEP_REASONING_BUDGET),
            },
            ModelVariant::WebSearch => GenerationOptions {
                endpoint_model_id: self.web_search.clone(),
                search_enabled: true,
                reasoning_budget: None,
            },
            ModelVariant::Fast => GenerationOptions {
                endpoint_model_id: self.fast.clone(),
                search_enabled: false,
                reasoning_budget: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_search_profile() {
        let options = ModelTable::default().resolve(ModelVariant::WebSearch);
        assert!(options.search_enabled);
        assert_eq!(options.reasoning_budget, None);
        assert_eq!(options.endpoint_model_id, "gemini-2.5-flash");
    }

    #[test]
    fn test_deep_reasoning_profile() {
        let options = ModelTable::default().resolve(ModelVariant::DeepReasoning);
        assert!(!options.search_enabled);
        assert_eq!(options.reasoning_budget, Some(DEEP_REASONING_BUDGET));
    }

    #[test]
    fn test_overridden_model_id() {
        let table = ModelTable {
            fast: "gemini-2.0-flash-lite".to_string(),
            ..ModelTable::default()
        };
        let options = table.resolve(ModelVariant::Fast);
        assert_eq!(options.endpoint_model_id, "gemini-2.0-flash-lite");
        assert!(!options.search_enabled);
        assert!(options.reasoning_budget.is_none());
    }
}
