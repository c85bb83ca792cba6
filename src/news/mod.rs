//! News Module
//!
//! Fetches news articles for import, either from the live BigKinds API or from
//! the bundled sample dataset when sample mode is configured.

pub mod bigkinds;
pub mod sample;

pub use bigkinds::BigKindsApi;
pub use sample::SampleNewsData;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::models::NewsArticle;
use crate::types::AppResult;

#[derive(Clone)]
pub struct NewsClient {
    live: Option<Arc<BigKindsApi>>,
    sample: SampleNewsData,
}

impl NewsClient {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let live = match (&config.news.api_key, config.news.sample_mode()) {
            (Some(key), false) => Some(Arc::new(BigKindsApi::new(key, &config.news, &config.http)?)),
            _ => None,
        };
        info!(sample_mode = live.is_none(), "News client configured");
        Ok(Self {
            live,
            sample: SampleNewsData,
        })
    }

    /// Client backed only by the bundled sample dataset.
    pub fn sample() -> Self {
        Self {
            live: None,
            sample: SampleNewsData,
        }
    }

    pub fn is_sample(&self) -> bool {
        self.live.is_none()
    }

    pub async fn search_news(&self, query: &str, limit: usize) -> AppResult<Vec<NewsArticle>> {
        match &self.live {
            Some(api) => api.search_news(query, limit).await,
            None => Ok(self.sample.search_news(query, limit)),
        }
    }

    pub async fn get_news_by_id(&self, id: &str) -> AppResult<Option<NewsArticle>> {
        match &self.live {
            Some(api) => api.get_news_by_id(id).await,
            None => Ok(self.sample.get_news_by_id(id)),
        }
    }

    pub async fn get_recent_news(&self, limit: usize) -> AppResult<Vec<NewsArticle>> {
        match &self.live {
            Some(api) => api.get_recent_news(limit).await,
            None => Ok(self.sample.get_recent_news(limit)),
        }
    }

    pub async fn get_news_by_category(&self, category: &str, limit: usize) -> AppResult<Vec<NewsArticle>> {
        match &self.live {
            Some(api) => api.get_news_by_category(category, limit).await,
            None => Ok(self.sample.get_news_by_category(category, limit)),
        }
    }

    pub async fn get_all_categories(&self) -> AppResult<Vec<String>> {
        match &self.live {
            Some(api) => api.get_all_categories().await,
            None => Ok(self.sample.get_all_categories()),
        }
    }
}
