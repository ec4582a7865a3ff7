use std::env;

pub const SERVICE_NAME: &str = "Gradient Copilot API";
pub const SERVICE_VERSION: &str = "1.0.0";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub serp_api_key: Option<String>,
}

impl Config {
    /// Reads the process environment once. Missing API keys are not an error here:
    /// the adapter that needs the key fails when it is called.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: non_empty_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            serp_api_key: non_empty_var("SERP_API_KEY"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
