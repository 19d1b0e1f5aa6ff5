//! PR Labeler Library
//!
//! GitHub webhook receiver that labels newly opened pull requests from the
//! paths they change. This library exposes core modules for testing.

pub mod config;
pub mod delivery;
pub mod error;
pub mod github;
pub mod handlers;
pub mod labeler;
pub mod labels;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod server;

// Re-export commonly used types for tests
pub use config::{AppConfig, GithubConfig, LabelerConfig, SecurityConfig, ServerConfig};
pub use delivery::DeliveryCache;
pub use error::{AppError, AppResult};
pub use github::{GithubClient, PullRequestApi};
pub use labeler::{LabelOutcome, Labeler};
pub use labels::LabelResolver;
pub use metrics::MetricsState;
pub use middleware::SignatureState;
pub use models::{ChangedFile, GithubEvent, LabelSet, PullRequestEvent, PullRequestRef};
pub use server::{build_app, router, WEBHOOK_PATH};
