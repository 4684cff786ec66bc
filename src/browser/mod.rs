//! Browser-automation seam.
//!
//! A [`Session`] is one browser context owned by exactly one worker. Sessions
//! are produced by a [`SessionFactory`], which carries the launch options.
//!
//! ```text
//! SessionFactory::new_session → navigate → wait_for_element → current_document → close
//! ```

mod chrome;

pub use chrome::{ChromeSession, ChromeSessionFactory};

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

/// One browser context.
#[async_trait]
pub trait Session: Send + Sync {
    /// Load `url` in the session's page
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until an element matching `selector` exists.
    ///
    /// Returns `Ok(false)` if `timeout` elapses first.
    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Serialized HTML of the current document
    async fn current_document(&self) -> Result<String>;

    /// Tear the session down. Called exactly once, on every exit path.
    async fn close(&mut self) -> Result<()>;
}

/// Creates sessions with fixed launch options.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn new_session(&self) -> Result<Box<dyn Session>>;
}
