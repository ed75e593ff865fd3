use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::app::error::{ReadLaterError, Result};
use crate::client::{BookmarkClient, Endpoints};
use crate::config::Config;
use crate::domain::Article;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::parser::FeedParser;
use crate::queue::SubmissionQueue;
use crate::store::SqliteStore;
use crate::transport::{HttpTransport, TcpReachability};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parser: FeedParser,
    pub client: BookmarkClient,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let service = &config.service;
        let endpoints = Endpoints::new(
            &service.base_url()?,
            &service.authenticate_path,
            &service.add_path,
        )?;

        let transport = Arc::new(HttpTransport::new(service.timeout(), &service.user_agent)?);
        let reachability = Arc::new(TcpReachability::new(service.reachability_timeout()));
        let queue = SubmissionQueue::with_max_pending(store.clone(), config.queue.max_pending);
        let client = BookmarkClient::new(endpoints, transport, reachability, store.clone(), queue)?
            .with_request_timeout(service.request_timeout());

        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(service.timeout(), &service.user_agent)?);
        let parser = FeedParser::new(config.feed.dialect());

        Ok(Self {
            config,
            store,
            fetcher,
            parser,
            client,
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Fetch a feed (the configured one when `feed_url` is `None`) and parse
    /// it into articles.
    pub async fn load_articles(&self, feed_url: Option<&str>) -> Result<Vec<Article>> {
        let url = Url::parse(feed_url.unwrap_or(&self.config.feed.url))?;
        let body = self.fetcher.fetch(&url).await?;
        let articles = self.parser.parse_bytes(&body)?;
        tracing::info!("Loaded {} articles from {}", articles.len(), url);
        Ok(articles)
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ReadLaterError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("readlater");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("readlater.db"))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, _url: &Url) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[tokio::test]
    async fn test_load_articles_uses_configured_dialect() {
        let mut config = Config::default();
        config.feed.entry_element = "item".into();
        config.feed.link_attribute = None;

        let ctx = AppContext::in_memory(config)
            .unwrap()
            .with_fetcher(Arc::new(StaticFetcher(
                "<rss><channel><item><title>One</title><link>https://example.com/1</link></item></channel></rss>",
            )));

        let articles = ctx.load_articles(None).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "One");
    }

    #[tokio::test]
    async fn test_load_articles_reports_malformed_feed() {
        let ctx = AppContext::in_memory(Config::default())
            .unwrap()
            .with_fetcher(Arc::new(StaticFetcher("<feed><entry>")));

        let result = ctx.load_articles(Some("https://example.com/feed.xml")).await;
        assert!(matches!(result, Err(ReadLaterError::Parse(_))));
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let mut config = Config::default();
        config.service.base_url = "not a url".into();

        assert!(matches!(
            AppContext::in_memory(config),
            Err(ReadLaterError::InvalidUrl(_))
        ));
    }
}
