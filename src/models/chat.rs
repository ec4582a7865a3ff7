use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

/// Multipart `/chat` form, collected before the pipeline runs.
#[derive(Debug, Default)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryEntry>,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MaterialRecommendation {
    pub title: String,
    pub url: String,
    pub description: String,
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub materials: Vec<MaterialRecommendation>,
    pub has_materials: bool,
}

impl ChatResponse {
    pub fn new(response: String, materials: Vec<MaterialRecommendation>) -> Self {
        let has_materials = !materials.is_empty();
        Self {
            response,
            materials,
            has_materials,
        }
    }
}
