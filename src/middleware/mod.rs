//! Middleware for the PR labeler
//!
//! Provides webhook signature verification

mod signature;

pub use signature::*;
