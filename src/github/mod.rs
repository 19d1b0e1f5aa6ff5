//! GitHub REST API access
//!
//! The labeler only needs two endpoints, expressed by [`PullRequestApi`]:
//! - list the files a pull request changes
//! - add labels to the pull request's issue

pub mod client;

pub use client::GithubClient;

use crate::error::AppResult;
use crate::models::{ChangedFile, LabelSet, PullRequestRef};

/// Pull request operations used by the labeler
#[async_trait::async_trait]
pub trait PullRequestApi: Send + Sync {
    /// All files changed by the pull request
    async fn list_files(&self, pr: &PullRequestRef) -> AppResult<Vec<ChangedFile>>;

    /// Add `labels` to the issue backing the pull request
    async fn add_labels(&self, pr: &PullRequestRef, labels: &LabelSet) -> AppResult<()>;

    /// Whether requests carry an access token
    fn is_authenticated(&self) -> bool;
}
