//! Webhook event models - the subset of GitHub's payloads the labeler reads

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Header carrying the event type
pub const EVENT_HEADER: &str = "x-github-event";
/// Header carrying the unique delivery id
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Event kind taken from the `x-github-event` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubEvent {
    /// Sent once when the webhook is created
    Ping,
    /// Pull request activity
    PullRequest,
    /// Anything the labeler does not handle
    Other(String),
}

impl GithubEvent {
    /// Stable name used for logging and metrics labels
    pub fn as_str(&self) -> &str {
        match self {
            GithubEvent::Ping => "ping",
            GithubEvent::PullRequest => "pull_request",
            GithubEvent::Other(name) => name,
        }
    }
}

impl From<&str> for GithubEvent {
    fn from(s: &str) -> Self {
        match s.trim() {
            "ping" => GithubEvent::Ping,
            "pull_request" => GithubEvent::PullRequest,
            other => GithubEvent::Other(other.to_string()),
        }
    }
}

impl FromStr for GithubEvent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(GithubEvent::from(s))
    }
}

impl std::fmt::Display for GithubEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull request event action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Reopened,
    Synchronize,
    Edited,
    Closed,
    Labeled,
    Unlabeled,
    /// Any action the labeler does not care about
    #[serde(other)]
    Other,
}

/// `pull_request` webhook payload
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    /// What happened to the pull request
    pub action: PullRequestAction,
    /// Pull request number
    pub number: u64,
    /// The pull request itself
    pub pull_request: PullRequest,
    /// Repository the pull request belongs to
    pub repository: Repository,
}

/// Pull request details
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    /// Branch the pull request targets
    pub base: BranchRef,
}

/// A branch reference (`base` / `head`)
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// Repository details
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

/// Repository owner (user or organization)
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

impl PullRequestEvent {
    /// Identifiers of the pull request this event is about
    pub fn pull_request_ref(&self) -> PullRequestRef {
        PullRequestRef {
            owner: self.repository.owner.login.clone(),
            repo: self.repository.name.clone(),
            number: self.number,
        }
    }

    /// Name of the branch the pull request targets
    pub fn base_branch(&self) -> &str {
        &self.pull_request.base.ref_name
    }
}

/// Identifies a pull request (and the issue sharing its number)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
