//! BigKinds API Client
//!
//! Thin wrapper over the BigKinds news REST API. Every endpoint wraps its
//! payload under `data`; records are parsed leniently because numeric and
//! string ids both occur in the wild.

use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::{HttpConfig, NewsConfig};
use crate::models::NewsArticle;
use crate::types::{AppError, AppResult};
use crate::utils::{http_client, with_retry};

pub struct BigKindsApi {
    client: Client,
    api_key: String,
    api_url: Url,
    max_attempts: u32,
}

impl BigKindsApi {
    pub fn new(api_key: &str, news: &NewsConfig, http: &HttpConfig) -> AppResult<Self> {
        let api_url = Url::parse(&news.api_url)
            .map_err(|e| AppError::Config(format!("invalid BIGKINDS_API_URL {}: {}", news.api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(AppError::Config(format!("BIGKINDS_API_URL is not a base URL: {}", news.api_url)));
        }

        Ok(Self {
            client: http_client(http)?,
            api_key: api_key.to_string(),
            api_url,
            max_attempts: http.max_attempts,
        })
    }

    /// Append path segments to the API URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("BIGKINDS_API_URL is not a base URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_data(&self, build: impl Fn(&Client) -> RequestBuilder) -> AppResult<Option<Value>> {
        let build = &build;
        let result = with_retry(
            || async move {
                let response = build(&self.client)
                    .bearer_auth(&self.api_key)
                    .send()
                    .await
                    .map_err(|e| AppError::NewsApi(format!("request failed: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::NewsApi(format!("API error ({}): {}", status, body)));
                }

                let mut payload: Value = response
                    .json()
                    .await
                    .map_err(|e| AppError::NewsApi(format!("malformed response: {}", e)))?;
                Ok(payload.get_mut("data").map(Value::take))
            },
            self.max_attempts,
        )
        .await;

        result.map_err(|e| {
            error!(error = %e, "BigKinds request failed");
            e
        })
    }

    async fn fetch_articles(&self, build: impl Fn(&Client) -> RequestBuilder) -> AppResult<Vec<NewsArticle>> {
        let data = self.fetch_data(build).await?;
        let articles: Vec<NewsArticle> = data
            .as_ref()
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_article).collect())
            .unwrap_or_default();
        debug!(count = articles.len(), "Parsed BigKinds articles");
        Ok(articles)
    }

    pub async fn search_news(&self, query: &str, limit: usize) -> AppResult<Vec<NewsArticle>> {
        info!(query = %query, limit, "Searching BigKinds news");
        let url = self.endpoint(&["search"])?;
        let body = serde_json::json!({ "query": query, "limit": limit });
        let mut articles = self.fetch_articles(|c| c.post(url.clone()).json(&body)).await?;
        articles.truncate(limit);
        Ok(articles)
    }

    pub async fn get_news_by_id(&self, id: &str) -> AppResult<Option<NewsArticle>> {
        let url = self.endpoint(&["news", id])?;
        let data = self.fetch_data(|c| c.get(url.clone())).await?;
        Ok(data.as_ref().and_then(parse_article))
    }

    pub async fn get_recent_news(&self, limit: usize) -> AppResult<Vec<NewsArticle>> {
        let url = self.endpoint(&["news", "recent"])?;
        let mut articles = self
            .fetch_articles(|c| c.get(url.clone()).query(&[("limit", limit)]))
            .await?;
        articles.truncate(limit);
        Ok(articles)
    }

    pub async fn get_news_by_category(&self, category: &str, limit: usize) -> AppResult<Vec<NewsArticle>> {
        let url = self.endpoint(&["news", "category", category])?;
        let mut articles = self
            .fetch_articles(|c| c.get(url.clone()).query(&[("limit", limit)]))
            .await?;
        articles.truncate(limit);
        Ok(articles)
    }

    pub async fn get_all_categories(&self) -> AppResult<Vec<String>> {
        let url = self.endpoint(&["categories"])?;
        let data = self.fetch_data(|c| c.get(url.clone())).await?;
        Ok(data
            .as_ref()
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Records without a title or body are dropped.
fn parse_article(value: &Value) -> Option<NewsArticle> {
    let title = string_field(value, "title");
    let content = string_field(value, "content");
    if title.trim().is_empty() || content.trim().is_empty() {
        return None;
    }

    let keywords = match value.get("keywords") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|k| k.as_str().map(String::from))
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Some(NewsArticle {
        id: string_field(value, "id"),
        title,
        content,
        source: string_field(value, "source"),
        date: string_field(value, "date"),
        category: string_field(value, "category"),
        keywords,
    })
}
