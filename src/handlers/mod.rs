//! HTTP handlers for the PR labeler

mod health;
mod webhook;

pub use health::*;
pub use webhook::*;
