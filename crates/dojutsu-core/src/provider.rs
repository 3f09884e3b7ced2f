//! Downstream LLM providers the daemon can route a pipeline to
//!
//! The client never talks to a provider itself. It only forwards the
//! provider name, model and API key as positional arguments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// LLM provider supported by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    OpenAi,
    Anthropic,
    Mistral,
    OpenRouter,
    HuggingFace,
}

impl Provider {
    /// Every supported provider
    pub const ALL: [Provider; 6] = [
        Provider::Groq,
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Mistral,
        Provider::OpenRouter,
        Provider::HuggingFace,
    ];

    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Mistral => "mistral",
            Provider::OpenRouter => "openrouter",
            Provider::HuggingFace => "huggingface",
        }
    }

    /// Model the daemon picks when none is given
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "moonshotai/kimi-k2-instruct-0905",
            Provider::OpenAi => "gpt-4o",
            Provider::Anthropic => "claude-sonnet-4-5",
            Provider::Mistral => "mistral-large-latest",
            Provider::OpenRouter => "openai/gpt-4o",
            Provider::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.3",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Mistral => "MISTRAL_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::HuggingFace => "HUGGINGFACE_API_KEY",
        }
    }

    /// Resolve the API key from an explicit value or the process environment
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        self.resolve_api_key_with(explicit, |name| std::env::var(name).ok())
    }

    /// Resolve the API key using `lookup` in place of the environment
    ///
    /// Placeholder keys containing `XXXX` are ignored.
    pub fn resolve_api_key_with<F>(
        &self,
        explicit: Option<&str>,
        lookup: F,
    ) -> Result<String, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(key) = explicit.filter(|k| !k.is_empty() && !k.contains("XXXX")) {
            return Ok(key.to_string());
        }

        let env_var = self.api_key_env();
        match lookup(env_var).filter(|k| !k.is_empty()) {
            Some(key) => Ok(key),
            None => Err(ConfigError::MissingApiKey {
                provider: self.to_string(),
                env_var,
            }),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| ConfigError::UnknownProvider(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_display() {
        for provider in Provider::ALL {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!("  Groq ".parse::<Provider>().unwrap(), Provider::Groq);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "cohere".parse::<Provider>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(name) if name == "cohere"));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Provider::OpenRouter).unwrap();
        assert_eq!(json, "\"openrouter\"");
        let parsed: Provider = serde_json::from_str("\"huggingface\"").unwrap();
        assert_eq!(parsed, Provider::HuggingFace);
    }

    #[test]
    fn test_explicit_key_wins() {
        let key = Provider::Groq
            .resolve_api_key_with(Some("gsk_live"), |_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(key, "gsk_live");
    }

    #[test]
    fn test_placeholder_key_falls_back_to_env() {
        let key = Provider::OpenAi
            .resolve_api_key_with(Some("sk-XXXX"), |name| {
                assert_eq!(name, "OPENAI_API_KEY");
                Some("sk-real".to_string())
            })
            .unwrap();
        assert_eq!(key, "sk-real");
    }

    #[test]
    fn test_missing_key_names_env_var() {
        let err = Provider::Mistral
            .resolve_api_key_with(None, |_| None)
            .unwrap_err();
        assert!(err.to_string().contains("MISTRAL_API_KEY"));

        let err = Provider::Groq
            .resolve_api_key_with(Some(""), |_| Some(String::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { env_var: "GROQ_API_KEY", .. }));
    }
}
