mod retry;

pub use retry::retry;

use std::time::Duration;

use tracing::{debug, warn};

use crate::app::{HarvestError, Result};
use crate::browser::Session;
use crate::config::FetcherConfig;

/// Result of trying to load the target page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The landmark element is present in the current document
    Ready,
    /// Every attempt failed
    Failed { attempts: u32 },
}

/// Navigates a session to the target and waits for the landmark element.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    landmark_selector: String,
    wait_timeout: Duration,
    max_attempts: u32,
}

impl PageFetcher {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            landmark_selector: config.landmark_selector.clone(),
            wait_timeout: config.wait_timeout(),
            max_attempts: config.max_attempts,
        }
    }

    /// Load `target` until the landmark appears, retrying up to the attempt limit.
    ///
    /// Every attempt is a fresh navigation to the same target, so the source
    /// may hand out a different random page each time.
    pub async fn acquire(&self, session: &dyn Session, target: &str) -> FetchOutcome {
        let result = retry(self.max_attempts, |attempt| async move {
            match self.attempt(session, target).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    warn!("{}", e);
                    warn!("Error connecting to {}. Attempt #{}.", target, attempt);
                    Err(e)
                }
            }
        })
        .await;

        match result {
            Ok(()) => {
                debug!("Landmark {} found on {}", self.landmark_selector, target);
                FetchOutcome::Ready
            }
            Err((attempts, _)) => FetchOutcome::Failed { attempts },
        }
    }

    async fn attempt(&self, session: &dyn Session, target: &str) -> Result<()> {
        session.navigate(target).await?;

        let found = session
            .wait_for_element(&self.landmark_selector, self.wait_timeout)
            .await?;

        if found {
            Ok(())
        } else {
            Err(HarvestError::LandmarkTimeout {
                selector: self.landmark_selector.clone(),
                timeout_secs: self.wait_timeout.as_secs(),
            })
        }
    }
}
