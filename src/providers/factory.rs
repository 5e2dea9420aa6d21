use crate::config::Config;
use crate::core::error::LeetobError;
use crate::format::messages::{NO_API_KEY, NO_HTTP_CLIENT};
use crate::providers::{LlmProvider, openai_compatible::OpenAICompatibleProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Which configured endpoint a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Text,
    Image,
}

pub type ProviderCreator =
    Box<dyn Fn(&Config) -> Result<Arc<dyn LlmProvider>, LeetobError> + Send + Sync>;

/// Builds model clients from the current configuration.
///
/// A fresh client is created per request so that config edits take effect immediately.
pub struct ProviderFactory {
    creators: HashMap<ProviderKind, ProviderCreator>,
}

fn openai_compatible(config: &Config, base_url: &str) -> Result<Arc<dyn LlmProvider>, LeetobError> {
    if config.api_key().trim().is_empty() {
        return Err(LeetobError::Provider(NO_API_KEY.to_string()));
    }

    let provider = OpenAICompatibleProvider::new(base_url.to_string(), config.api_key().to_string())
        .map_err(|e| {
            error!("Failed to build model client for {}: {}", base_url, e);
            LeetobError::Provider(NO_HTTP_CLIENT.to_string())
        })?;
    Ok(Arc::new(provider) as Arc<dyn LlmProvider>)
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators = HashMap::new();

        creators.insert(
            ProviderKind::Text,
            Box::new(|config: &Config| openai_compatible(config, &config.base_url))
                as ProviderCreator,
        );

        creators.insert(
            ProviderKind::Image,
            Box::new(|config: &Config| openai_compatible(config, config.image_endpoint()))
                as ProviderCreator,
        );

        Self { creators }
    }

    /// Replace the creator for `kind`, e.g. with a scripted provider.
    pub fn with_creator(mut self, kind: ProviderKind, creator: ProviderCreator) -> Self {
        self.creators.insert(kind, creator);
        self
    }

    /// Use one provider instance for every kind.
    pub fn fixed(provider: Arc<dyn LlmProvider>) -> Self {
        let text = provider.clone();
        Self::new()
            .with_creator(
                ProviderKind::Text,
                Box::new(move |_: &Config| Ok(text.clone())) as ProviderCreator,
            )
            .with_creator(
                ProviderKind::Image,
                Box::new(move |_: &Config| Ok(provider.clone())) as ProviderCreator,
            )
    }

    pub fn create(
        &self,
        kind: ProviderKind,
        config: &Config,
    ) -> Result<Arc<dyn LlmProvider>, LeetobError> {
        self.creators
            .get(&kind)
            .ok_or_else(|| LeetobError::Config(format!("Provider not found: {:?}", kind)))
            .and_then(|creator| creator(config))
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_instructional() {
        let mut config = Config::default();
        config.api_key = "  ".into();
        match ProviderFactory::new().create(ProviderKind::Text, &config) {
            Err(LeetobError::Provider(msg)) => assert_eq!(msg, NO_API_KEY),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_default_config_builds_both_clients() {
        let factory = ProviderFactory::new();
        let config = Config::default();
        assert!(factory.create(ProviderKind::Text, &config).is_ok());
        assert!(factory.create(ProviderKind::Image, &config).is_ok());
    }
}
