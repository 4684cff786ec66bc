use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{HarvestError, Result};
use crate::browser::{Session, SessionFactory};

/// How often the DOM is polled while waiting for an element
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a closed browser gets to exit before it is killed
const EXIT_GRACE: Duration = Duration::from_secs(10);

static SESSION_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Launches one Chrome process per session.
#[derive(Debug, Clone, Default)]
pub struct ChromeSessionFactory {
    headless: bool,
    binary_location: Option<PathBuf>,
}

impl ChromeSessionFactory {
    pub fn new(headless: bool, binary_location: Option<PathBuf>) -> Self {
        Self {
            headless,
            binary_location,
        }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .user_data_dir(profile_dir);

        if !self.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = self.binary_location {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| HarvestError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn new_session(&self) -> Result<Box<dyn Session>> {
        // Concurrent Chrome processes must not share a profile directory
        let id = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let profile_dir = ProfileDir::new(std::env::temp_dir().join(format!(
            "pagecrop-{}-{}",
            std::process::id(),
            id
        )));

        let config = self.browser_config(profile_dir.path())?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            HarvestError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drive CDP traffic until the browser goes away
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut session = ChromeSession {
                    browser,
                    page: None,
                    handler_task,
                    profile_dir,
                };
                let _ = session.close().await;
                return Err(HarvestError::Browser(format!("Failed to create page: {}", e)));
            }
        };

        debug!(session = id, "Browser session started");

        Ok(Box::new(ChromeSession {
            browser,
            page: Some(page),
            handler_task,
            profile_dir,
        }))
    }
}

/// Temporary Chrome profile, removed when dropped.
#[derive(Debug)]
struct ProfileDir(PathBuf);

impl ProfileDir {
    fn new(path: PathBuf) -> Self {
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            if e.kind() != io::ErrorKind::NotFound {
                debug!("Could not remove {}: {}", self.0.display(), e);
            }
        }
    }
}

/// Wait for the browser process after a close command.
///
/// Returns `None` when the close failed or the process outlives `limit`;
/// the caller must then kill it.
async fn wait_for_exit<T, F>(closed: bool, wait: F, limit: Duration) -> Option<io::Result<T>>
where
    F: Future<Output = io::Result<T>>,
{
    if !closed {
        return None;
    }
    tokio::time::timeout(limit, wait).await.ok()
}

/// A chromiumoxide browser driving a single page.
///
/// Dropping the session without [`Session::close`] still stops the CDP
/// handler and removes the profile directory.
pub struct ChromeSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    profile_dir: ProfileDir,
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

impl ChromeSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| HarvestError::Browser("Session has no open page".to_string()))
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| HarvestError::Navigation(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let page = self.page()?;

        let found = tokio::time::timeout(timeout, async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        Ok(found.is_ok())
    }

    async fn current_document(&self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to read page content: {}", e)))
    }

    async fn close(&mut self) -> Result<()> {
        debug!("Closing browser using {}", self.profile_dir.path().display());

        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }

        let closed = self.browser.close().await;

        match wait_for_exit(closed.is_ok(), self.browser.wait(), EXIT_GRACE).await {
            Some(Ok(_)) => {}
            Some(Err(e)) => warn!("Browser process did not exit cleanly: {}", e),
            None => {
                warn!("Browser did not shut down, killing it");
                if let Some(Err(e)) = self.browser.kill().await {
                    warn!("Failed to kill browser process: {}", e);
                }
            }
        }
        self.handler_task.abort();

        closed
            .map(|_| ())
            .map_err(|e| HarvestError::Browser(format!("Failed to close browser: {}", e)))
    }
}
