use std::sync::Arc;

mod model;
mod ollama;
mod provider;

pub use model::{
    ChatMessage, ChatRequest, ChatResponse, DEFAULT_ENDPOINT, DEFAULT_MODEL, ResponseMessage,
    Role,
};
pub use ollama::{OLLAMA_PROVIDER_ID, OllamaProvider};
pub use provider::{ChatProvider, ProviderConfig, ProviderError, ProviderResult};

pub fn create_provider(config: ProviderConfig) -> ProviderResult<Arc<dyn ChatProvider>> {
    let provider = OllamaProvider::new(config)?;
    tracing::info!(
        provider_id = provider.id(),
        endpoint = provider.endpoint(),
        model = provider.model(),
        "created chat provider"
    );
    Ok(Arc::new(provider))
}
