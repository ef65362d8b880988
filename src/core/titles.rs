use crate::domain::model::{PageTitle, ScrapeReport, TitleOutcome};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, validate_timeout, Validate};
use reqwest::Client;
use ::scraper::{Html, Selector};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

pub const DEFAULT_MAX_WORKERS: usize = 5;
pub const MAX_WORKERS_LIMIT: usize = 32;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_TITLES_FILE: &str = "titles.txt";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub max_workers: usize,
    pub request_timeout: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Validate for ScraperConfig {
    fn validate(&self) -> Result<()> {
        validate_range("max_workers", self.max_workers, 1, MAX_WORKERS_LIMIT)?;
        validate_timeout("request_timeout", self.request_timeout)
    }
}

pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// 同時最多 `max_workers` 個請求；每個請求都有逾時，結果依完成順序收集
pub struct TitleScraper {
    client: Client,
    config: ScraperConfig,
}

impl TitleScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub async fn scrape(&self, urls: Arc<[Url]>) -> ScrapeReport {
        let started_at = chrono::Utc::now();
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut joins = JoinSet::new();

        tracing::info!(
            "🚀 Scraping {} URL(s) with up to {} workers",
            urls.len(),
            self.config.max_workers
        );

        for url in urls.iter().cloned() {
            let client = self.client.clone();
            let semaphore = semaphore.clone();
            joins.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_title(&client, &url).await,
                    Err(_) => TitleOutcome::Failed("worker pool closed".to_string()),
                };
                PageTitle { url, outcome }
            });
        }

        let mut pages = Vec::with_capacity(urls.len());
        while let Some(joined) = joins.join_next().await {
            match joined {
                Ok(page) => {
                    match &page.outcome {
                        TitleOutcome::Title(title) => {
                            tracing::info!("Title of {}: {}", page.url, title)
                        }
                        other => tracing::warn!("⚠️ {}: {}", page.url, other),
                    }
                    pages.push(page);
                }
                Err(e) => tracing::error!("❌ Scrape worker failed: {}", e),
            }
        }

        let elapsed = started.elapsed();
        tracing::info!("Scraping completed in {:.2} seconds.", elapsed.as_secs_f64());

        ScrapeReport {
            started_at,
            elapsed,
            pages,
        }
    }
}

async fn fetch_title(client: &Client, url: &Url) -> TitleOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => return TitleOutcome::TimedOut,
        Err(e) => return TitleOutcome::Failed(e.to_string()),
    };

    let status = response.status();
    if !status.is_success() {
        return TitleOutcome::HttpStatus(status.as_u16());
    }

    match response.text().await {
        Ok(body) => extract_title(&body)
            .map(TitleOutcome::Title)
            .unwrap_or(TitleOutcome::MissingTitle),
        Err(e) if e.is_timeout() => TitleOutcome::TimedOut,
        Err(e) => TitleOutcome::Failed(e.to_string()),
    }
}

/// 每行一個標題，略過失敗的頁面；回傳寫入的標題數
pub async fn save_titles<S: Storage>(
    storage: &S,
    report: &ScrapeReport,
    file_name: &str,
) -> Result<usize> {
    let mut content = String::new();
    let mut written = 0;
    for title in report.titles() {
        content.push_str(title);
        content.push('\n');
        written += 1;
    }

    storage.write_file(file_name, content.as_bytes()).await?;
    tracing::debug!("Saved {} title(s) to {}", written, file_name);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><title>  Example\n Domain </title></head></html>"),
            Some("Example Domain".to_string())
        );
        assert_eq!(extract_title("<html><body>No title</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }

    #[test]
    fn test_config_validation() {
        assert!(ScraperConfig::default().validate().is_ok());
        assert!(ScraperConfig {
            max_workers: 0,
            ..ScraperConfig::default()
        }
        .validate()
        .is_err());
        assert!(ScraperConfig {
            max_workers: MAX_WORKERS_LIMIT + 1,
            ..ScraperConfig::default()
        }
        .validate()
        .is_err());
        assert!(ScraperConfig {
            request_timeout: Duration::ZERO,
            ..ScraperConfig::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(TitleScraper::new(ScraperConfig {
            max_workers: 0,
            ..ScraperConfig::default()
        })
        .is_err());
    }
}
