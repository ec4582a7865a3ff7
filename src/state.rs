use std::sync::Arc;

use crate::config::Config;
use crate::services::gemini::{GeminiClient, LanguageModel};
use crate::services::search::{MaterialSearch, SerpApiSearch};

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn MaterialSearch>,
    pub llm: Arc<dyn LanguageModel>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_adapters(
            Arc::new(SerpApiSearch::new(config)),
            Arc::new(GeminiClient::new(config)),
        )
    }

    pub fn with_adapters(search: Arc<dyn MaterialSearch>, llm: Arc<dyn LanguageModel>) -> Self {
        Self { search, llm }
    }
}
