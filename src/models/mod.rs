//! Data models for webhook events and pull request contents

mod event;
mod file;

pub use event::*;
pub use file::*;
