//! reqwest-based GitHub REST client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::PullRequestApi;
use crate::config::GithubConfig;
use crate::error::{AppError, AppResult};
use crate::metrics::MetricsState;
use crate::models::{ChangedFile, LabelSet, PullRequestRef};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client
pub struct GithubClient {
    /// HTTP client
    client: reqwest::Client,
    /// API base URL without trailing slash
    api_url: String,
    /// Access token
    token: Option<SecretString>,
    /// Page size for file listings
    files_per_page: u32,
    /// Maximum pages fetched per pull request
    max_file_pages: u32,
    /// Optional latency metrics
    metrics: Option<Arc<MetricsState>>,
}

impl GithubClient {
    /// Create a new client from configuration
    pub fn new(config: &GithubConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        let token = config
            .token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::new(t.clone()));

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            files_per_page: config.files_per_page.clamp(1, 100),
            max_file_pages: config.max_file_pages.max(1),
            metrics: None,
        })
    }

    /// Record request latency into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn files_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/files",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn labels_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/labels",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => {
                request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            }
            None => request,
        }
    }

    fn observe(&self, endpoint: &str, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics
                .github_latency
                .with_label_values(&[endpoint])
                .observe(started.elapsed().as_secs_f64() * 1000.0);
        }
    }

    /// Turn a non-success response into an upstream error
    async fn check_status(response: reqwest::Response, what: &str) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Upstream(format!("{} returned {} - {}", what, status, body)))
    }
}

#[async_trait]
impl PullRequestApi for GithubClient {
    async fn list_files(&self, pr: &PullRequestRef) -> AppResult<Vec<ChangedFile>> {
        let url = self.files_url(pr);
        let mut files = Vec::new();

        for page in 1..=self.max_file_pages {
            let started = Instant::now();
            let request = self.client.get(&url).query(&[
                ("per_page", self.files_per_page),
                ("page", page),
            ]);
            let response = self.authorize(request).send().await;
            self.observe("list_files", started);

            let response = Self::check_status(response?, "Listing pull request files").await?;
            let batch: Vec<ChangedFile> = response.json().await?;
            let batch_len = batch.len();
            files.extend(batch);

            tracing::debug!(
                pull_request = %pr,
                page = page,
                files = batch_len,
                "Fetched pull request files page"
            );

            if batch_len < self.files_per_page as usize {
                break;
            }

            if page == self.max_file_pages {
                tracing::warn!(
                    pull_request = %pr,
                    pages = page,
                    "Stopped listing files at page limit"
                );
            }
        }

        Ok(files)
    }

    async fn add_labels(&self, pr: &PullRequestRef, labels: &LabelSet) -> AppResult<()> {
        let started = Instant::now();
        let request = self.client.post(self.labels_url(pr)).json(labels);
        let response = self.authorize(request).send().await;
        self.observe("add_labels", started);

        Self::check_status(response?, "Adding labels").await?;

        tracing::info!(pull_request = %pr, labels = %labels, "Labels added");
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
