//! Conversation turns, model variants and citation sources

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person chatting with the mentor
    User,
    /// The generative model (including the UI welcome message)
    Model,
}

impl Role {
    /// Role tag used by the generation backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// Interface language; selects the system template and UI strings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Simplified Chinese
    Zh,
}

impl Language {
    /// Parse a language code such as "en" or "zh-CN"
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        if code == "en" || code.starts_with("en-") {
            Some(Self::En)
        } else if code == "zh" || code.starts_with("zh-") {
            Some(Self::Zh)
        } else {
            None
        }
    }

    /// The other supported language
    pub fn toggled(&self) -> Self {
        match self {
            Self::En => Self::Zh,
            Self::Zh => Self::En,
        }
    }
}

/// Generation profile selected by the user for a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Slow model with an extended reasoning budget
    DeepReasoning,
    /// Model with the web search tool enabled
    WebSearch,
    /// Lightweight model for quick answers
    Fast,
}

impl ModelVariant {
    /// All variants in display order
    pub const ALL: [ModelVariant; 3] = [Self::DeepReasoning, Self::WebSearch, Self::Fast];

    /// Localized display name
    pub fn display_name(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::DeepReasoning, Language::En) => "Deep Reasoning (Pro)",
            (Self::WebSearch, Language::En) => "Web Search",
            (Self::Fast, Language::En) => "Fast Answers",
            (Self::DeepReasoning, Language::Zh) => "深度思考 (Pro)",
            (Self::WebSearch, Language::Zh) => "联网搜索",
            (Self::Fast, Language::Zh) => "快速问答",
        }
    }
}

/// Web source returned as grounding metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

impl Source {
    /// Label for display, falling back to the URI when the title is blank
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.uri
        } else {
            &self.title
        }
    }
}

/// One immutable turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Unique turn ID
    pub id: Uuid,
    /// Author
    pub role: Role,
    /// Literal text of the turn
    pub content: String,
    /// Creation time
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Variant used to produce (or request) this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_variant: Option<ModelVariant>,
    /// Web sources backing a model reply, absent when none were returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Source>>,
}

impl ConversationTurn {
    fn new(role: Role, content: impl Into<String>, model_variant: Option<ModelVariant>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now(),
            model_variant,
            citations: None,
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>, variant: ModelVariant) -> Self {
        Self::new(Role::User, content, Some(variant))
    }

    /// Create a model turn
    pub fn model(content: impl Into<String>, variant: Option<ModelVariant>) -> Self {
        Self::new(Role::Model, content, variant)
    }

    /// Attach web sources to a model turn
    pub fn with_citations(mut self, citations: Option<Vec<Source>>) -> Self {
        self.citations = citations;
        self
    }

    /// Check the author
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("EN"), Some(Language::En));
        assert_eq!(Language::from_code("zh-CN"), Some(Language::Zh));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::Zh.toggled(), Language::En);
    }

    #[test]
    fn test_every_variant_has_distinct_names() {
        for language in [Language::En, Language::Zh] {
            let names: std::collections::HashSet<&str> = ModelVariant::ALL
                .iter()
                .map(|variant| variant.display_name(language))
                .collect();
            assert_eq!(names.len(), ModelVariant::ALL.len());
        }
        assert_eq!(ModelVariant::ALL[0], ModelVariant::DeepReasoning);
    }

    #[test]
    fn test_source_label_falls_back_to_uri() {
        let source = Source {
            uri: "https://example.com/cac".to_string(),
            title: " ".to_string(),
        };
        assert_eq!(source.label(), "https://example.com/cac");
    }

    #[test]
    fn test_turn_serializes_without_empty_citations() {
        let turn = ConversationTurn::user("How do I lower CAC?", ModelVariant::Fast);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["model_variant"], "fast");
        assert!(json.get("citations").is_none());
    }
}
