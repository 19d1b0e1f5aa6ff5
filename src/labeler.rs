//! Pull request labeling pipeline
//!
//! fetch changed files → infer labels → publish labels

use std::sync::Arc;

use crate::error::AppResult;
use crate::github::PullRequestApi;
use crate::labels::LabelResolver;
use crate::models::{LabelSet, PullRequestRef};

/// Result of labeling one pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    /// Labels were added
    Labeled(LabelSet),
    /// No rule produced a label; nothing was published
    NoLabels,
}

/// Labels pull requests from their changed files
pub struct Labeler {
    api: Arc<dyn PullRequestApi>,
    resolver: LabelResolver,
}

impl Labeler {
    pub fn new(api: Arc<dyn PullRequestApi>, resolver: LabelResolver) -> Self {
        Self { api, resolver }
    }

    /// Fetch the pull request's files, infer labels and add them
    pub async fn label_pull_request(
        &self,
        pr: &PullRequestRef,
        base_branch: Option<&str>,
    ) -> AppResult<LabelOutcome> {
        let files = self.api.list_files(pr).await?;
        let labels = self.resolver.resolve(&files, base_branch);

        tracing::debug!(
            pull_request = %pr,
            files = files.len(),
            labels = %labels,
            "Resolved labels"
        );

        if labels.is_empty() {
            tracing::info!(pull_request = %pr, "No labels matched changed files");
            return Ok(LabelOutcome::NoLabels);
        }

        self.api.add_labels(pr, &labels).await?;
        Ok(LabelOutcome::Labeled(labels))
    }
}
