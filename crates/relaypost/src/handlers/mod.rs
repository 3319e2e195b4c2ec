//! HTTP request handlers.

mod health;
mod slack;
mod version;

pub use health::{livez, readyz};
pub use slack::slack_events;
pub use version::version;
