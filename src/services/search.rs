use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::MaterialRecommendation;

const SERP_API_URL: &str = "https://serpapi.com/search.json";
const QUERY_SUFFIX: &str = "tutorial course";
const RESULT_COUNT: &str = "10";
const LANGUAGE_HINT: &str = "id";

const MAX_CANDIDATES: usize = 5;
const MAX_MATERIALS: usize = 4;
const DESCRIPTION_LIMIT: usize = 150;

const EDUCATIONAL_DOMAINS: &[&str] = &[
    "youtube.com",
    "coursera.org",
    "udemy.com",
    "edx.org",
    "khanacademy.org",
    "w3schools.com",
    "freecodecamp.org",
    "geeksforgeeks.org",
    "developer.mozilla.org",
    "tutorialspoint.com",
    "medium.com",
    "dev.to",
    "dicoding.com",
];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SERP_API_KEY is not configured")]
    MissingApiKey,
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search API returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait MaterialSearch: Send + Sync {
    async fn search(&self, keywords: &str) -> Result<Vec<MaterialRecommendation>, SearchError>;
}

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

pub struct SerpApiSearch {
    client: Client,
    api_key: Option<String>,
}

impl SerpApiSearch {
    pub fn new(config: &Config) -> Self {
        SerpApiSearch {
            client: Client::new(),
            api_key: config.serp_api_key.clone(),
        }
    }
}

#[async_trait]
impl MaterialSearch for SerpApiSearch {
    async fn search(&self, keywords: &str) -> Result<Vec<MaterialRecommendation>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        let query = format!("{} {}", keywords, QUERY_SUFFIX);
        debug!(%query, "searching learning materials");

        let res = self
            .client
            .get(SERP_API_URL)
            .query(&[
                ("engine", "google"),
                ("q", query.as_str()),
                ("api_key", api_key),
                ("num", RESULT_COUNT),
                ("hl", LANGUAGE_HINT),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        let body: SerpResponse = res.json().await?;
        Ok(curate(body.organic_results))
    }
}

fn curate(results: Vec<OrganicResult>) -> Vec<MaterialRecommendation> {
    results
        .into_iter()
        .take(MAX_CANDIDATES)
        .filter(|r| is_educational(&r.link) || mentions_learning(&r.title))
        .map(|r| MaterialRecommendation {
            source: extract_source(&r.link),
            description: truncate_description(&r.snippet),
            title: r.title,
            url: r.link,
        })
        .take(MAX_MATERIALS)
        .collect()
}

fn is_educational(url: &str) -> bool {
    let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
        Some(host) => host,
        None => return false,
    };
    EDUCATIONAL_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

fn mentions_learning(title: &str) -> bool {
    let title = title.to_lowercase();
    title.contains("tutorial") || title.contains("course")
}

/// Third `/`-separated segment, i.e. the host of `scheme://host/...`.
pub fn extract_source(url: &str) -> String {
    url.split('/').nth(2).unwrap_or_default().to_string()
}

pub fn truncate_description(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_LIMIT {
        let cut: String = text.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn search_url(base: &str, param: &str, value: &str) -> String {
    match Url::parse_with_params(base, &[(param, value)]) {
        Ok(url) => url.to_string(),
        Err(_) => base.to_string(),
    }
}

pub fn fallback_materials(keywords: &str) -> Vec<MaterialRecommendation> {
    vec![
        MaterialRecommendation {
            title: format!("Tutorial {} - YouTube", keywords),
            url: search_url(
                "https://www.youtube.com/results",
                "search_query",
                &format!("{} tutorial", keywords),
            ),
            description: format!("Kumpulan video tutorial tentang {} untuk pemula hingga mahir.", keywords),
            source: "www.youtube.com".to_string(),
        },
        MaterialRecommendation {
            title: format!("Kursus {} - Coursera", keywords),
            url: search_url("https://www.coursera.org/search", "query", keywords),
            description: format!("Kursus online terstruktur tentang {} dari universitas terkemuka.", keywords),
            source: "www.coursera.org".to_string(),
        },
        MaterialRecommendation {
            title: format!("Belajar {} - freeCodeCamp", keywords),
            url: search_url("https://www.freecodecamp.org/news/search/", "query", keywords),
            description: format!("Artikel dan panduan gratis untuk mempelajari {}.", keywords),
            source: "www.freecodecamp.org".to_string(),
        },
    ]
}

/// Runs the search and swaps any failure for the static fallback set.
pub async fn find_materials(search: &dyn MaterialSearch, keywords: &str) -> Vec<MaterialRecommendation> {
    match search.search(keywords).await {
        Ok(materials) => materials,
        Err(err) => {
            warn!(error = %err, keywords, "material search failed, using fallback materials");
            fallback_materials(keywords)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSearch;

    #[async_trait]
    impl MaterialSearch for FailingSearch {
        async fn search(&self, _keywords: &str) -> Result<Vec<MaterialRecommendation>, SearchError> {
            Err(SearchError::MissingApiKey)
        }
    }

    fn result(title: &str, link: &str, snippet: &str) -> OrganicResult {
        OrganicResult {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[actix_web::test]
    async fn failed_search_falls_back_to_three_materials() {
        let materials = find_materials(&FailingSearch, "machine learning").await;
        assert_eq!(materials.len(), 3);
        assert!(materials.iter().all(|m| m.title.contains("machine learning")));
    }

    #[actix_web::test]
    async fn missing_key_is_reported_as_error() {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0,
            gemini_api_key: None,
            gemini_model: "test".into(),
            serp_api_key: None,
        };
        let err = SerpApiSearch::new(&config).search("rust").await.unwrap_err();
        assert!(matches!(err, SearchError::MissingApiKey));
    }

    #[test]
    fn fallback_urls_carry_keywords_as_one_query_value() {
        let keywords = "learn rust&go c#/pointers ünïcode";
        let materials = fallback_materials(keywords);
        let expected = [format!("{} tutorial", keywords), keywords.to_string(), keywords.to_string()];

        for (material, expected) in materials.iter().zip(expected.iter()) {
            let url = Url::parse(&material.url).unwrap();
            assert_eq!(url.fragment(), None);
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            assert_eq!(pairs.len(), 1);
            assert_eq!(&pairs[0].1, expected);
            assert_eq!(url.host_str(), Some(material.source.as_str()));
        }
    }

    #[test]
    fn allow_list_ignores_port_and_userinfo() {
        assert!(is_educational("https://www.youtube.com:443/watch?v=1"));
        assert!(is_educational("https://user@coursera.org/learn/ml"));
        assert!(!is_educational("https://notyoutube.com/watch"));
        assert!(!is_educational("not-a-url"));
    }

    #[test]
    fn source_is_third_url_segment() {
        assert_eq!(extract_source("https://www.coursera.org/learn/ml"), "www.coursera.org");
        assert_eq!(extract_source("not-a-url"), "");
    }

    #[test]
    fn long_descriptions_are_truncated_with_ellipsis() {
        let long = "a".repeat(200);
        let cut = truncate_description(&long);
        assert_eq!(cut.chars().count(), 153);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_description("short"), "short");
    }

    #[test]
    fn curation_keeps_educational_results_and_caps_at_four() {
        let results = vec![
            result("Intro to Rust", "https://www.youtube.com/watch?v=1", "video"),
            result("Random blog", "https://example.com/post", "not relevant"),
            result("Rust Course for beginners", "https://example.org/rust", &"x".repeat(300)),
            result("Learn Rust", "https://www.udemy.com/rust", "paid"),
            result("Rust docs", "https://developer.mozilla.org/x", "docs"),
            result("Sixth tutorial", "https://www.edx.org/rust", "dropped, beyond first five"),
        ];

        let materials = curate(results);
        assert_eq!(materials.len(), 4);
        assert_eq!(materials[0].source, "www.youtube.com");
        assert_eq!(materials[1].title, "Rust Course for beginners");
        assert!(materials.iter().all(|m| m.description.chars().count() <= 153));
        assert!(materials.iter().all(|m| m.url != "https://example.com/post"));
    }

    #[test]
    fn serp_payload_without_organic_results_is_empty() {
        let body: SerpResponse = serde_json::from_str(r#"{"search_metadata": {}}"#).unwrap();
        assert!(curate(body.organic_results).is_empty());
    }
}
